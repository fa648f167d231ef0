//! EV Calculator
//!
//! ```text
//! EV = p * (dec - 1) * stake - (1 - p) * stake
//! ```
//!
//! Where:
//!     p = hit probability (defaults to the price's implied probability)
//!     dec = decimal odds
//!
//! With p taken from the price itself, p * dec == 1 and EV is 0 up to float
//! error. The bookmaker's margin only shows once p comes from somewhere
//! else, e.g. the de-vigged `Leg::fair_probability`.

use super::odds::{american_to_decimal, implied_probability};
use super::value::score_leg;
use crate::error::{validate_probability, validate_stake, OddsError};
use crate::models::{ComboPricing, Leg, LegValuation};

/// Expected value of a payout at the given decimal odds
pub fn expected_value(decimal: f64, hit_prob: f64, stake: f64) -> f64 {
    hit_prob * (decimal - 1.0) * stake - (1.0 - hit_prob) * stake
}

/// EV of a single leg
///
/// # Examples
/// ```
/// use parlay::core::ev::leg_ev;
/// // 60% on +150 is a good bet
/// assert!(leg_ev(150, Some(0.6), 10.0).unwrap() > 0.0);
/// // Market-implied probability alone carries no edge
/// assert!(leg_ev(150, None, 10.0).unwrap().abs() < 1e-9);
/// ```
pub fn leg_ev(odds: i32, hit_prob: Option<f64>, stake: f64) -> Result<f64, OddsError> {
    validate_stake(stake)?;
    let dec = american_to_decimal(odds)?;
    let p = match hit_prob {
        Some(p) => {
            validate_probability(p)?;
            p
        }
        None => implied_probability(odds)?,
    };
    Ok(expected_value(dec, p, stake))
}

/// EV of a combo at its combined decimal price and joint hit probability
pub fn combo_ev(pricing: &ComboPricing, stake: f64) -> Result<f64, OddsError> {
    validate_stake(stake)?;
    Ok(expected_value(
        pricing.combined_decimal,
        pricing.combined_hit_prob,
        stake,
    ))
}

/// EV of a combo with caller-supplied per-leg probabilities
pub fn combo_ev_with_probabilities(
    pricing: &ComboPricing,
    hit_probs: &[f64],
    stake: f64,
) -> Result<f64, OddsError> {
    validate_stake(stake)?;
    for &p in hit_probs {
        validate_probability(p)?;
    }
    let joint: f64 = hit_probs.iter().product();
    Ok(expected_value(pricing.combined_decimal, joint, stake))
}

/// Full valuation of one leg at a stake
///
/// `estimate` is an independent hit probability; without one the leg is
/// valued at its implied probability.
pub fn value_leg(leg: &Leg, stake: f64, estimate: Option<f64>) -> Result<LegValuation, OddsError> {
    let implied = implied_probability(leg.odds)?;
    let ev = leg_ev(leg.odds, estimate, stake)?;
    let fair_ev = leg
        .fair_probability
        .map(|p| leg_ev(leg.odds, Some(p), stake))
        .transpose()?;

    Ok(LegValuation {
        implied_probability: implied,
        fair_probability: leg.fair_probability,
        value_score: score_leg(leg.odds, estimate)?,
        stake,
        ev,
        fair_ev,
    })
}
