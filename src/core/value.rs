//! Value Scoring
//!
//! A 0-100 ranking heuristic per outcome. It is NOT an edge estimate and
//! makes no claim about mispriced lines.
//!
//! Implied-probability form:
//!     score = round(min(100, (p + safety_boost) * 100))
//!     safety_boost = min(|odds| / 1200, 0.25) for favorites, else 0
//!
//! Efficiency form (only when an independent probability is available):
//!     efficiency = true_prob - p
//!     score = clamp(0, 100, round(efficiency * 250 + 50))

use super::odds::implied_probability;
use crate::error::{validate_probability, OddsError};

/// Cap on the favorite bonus
pub const MAX_SAFETY_BOOST: f64 = 0.25;

/// |odds| / SAFETY_BOOST_DIVISOR gives the favorite bonus
const SAFETY_BOOST_DIVISOR: f64 = 1200.0;

/// Points per unit of efficiency in the baseline form
const EFFICIENCY_SCALE: f64 = 250.0;

/// Bonus nudging heavy favorites up the ranking
pub fn safety_boost(odds: i32) -> f64 {
    if odds < 0 {
        (odds.unsigned_abs() as f64 / SAFETY_BOOST_DIVISOR).min(MAX_SAFETY_BOOST)
    } else {
        0.0
    }
}

/// Score a price from its implied probability plus the favorite bonus
///
/// # Examples
/// ```
/// use parlay::core::value::value_score;
/// assert_eq!(value_score(150).unwrap(), 40);
/// assert_eq!(value_score(-110).unwrap(), 62);
/// ```
pub fn value_score(odds: i32) -> Result<u8, OddsError> {
    let p = implied_probability(odds)?;
    let score = ((p + safety_boost(odds)) * 100.0).min(100.0).round();
    Ok(score as u8)
}

/// Score a price against an independent probability estimate
///
/// 50 means the estimate agrees with the market.
pub fn value_score_vs_baseline(true_prob: f64, market_odds: i32) -> Result<u8, OddsError> {
    validate_probability(true_prob)?;
    let efficiency = true_prob - implied_probability(market_odds)?;
    let score = (efficiency * EFFICIENCY_SCALE + 50.0).round().clamp(0.0, 100.0);
    Ok(score as u8)
}

/// Pick the efficiency form when an estimate exists, else the implied form
pub fn score_leg(odds: i32, estimate: Option<f64>) -> Result<u8, OddsError> {
    match estimate {
        Some(true_prob) => value_score_vs_baseline(true_prob, odds),
        None => value_score(odds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safety_boost() {
        assert_eq!(safety_boost(150), 0.0);
        assert!((safety_boost(-120) - 0.1).abs() < 1e-12);
        assert!((safety_boost(-300) - 0.25).abs() < 1e-12);
        assert!((safety_boost(-5000) - MAX_SAFETY_BOOST).abs() < 1e-12);
    }

    #[test]
    fn test_value_score_underdog_is_implied_pct() {
        // 100 / 250 = 0.40
        assert_eq!(value_score(150).unwrap(), 40);
        assert_eq!(value_score(100).unwrap(), 50);
    }

    #[test]
    fn test_value_score_favorite_gets_boost() {
        // 0.5238 + 0.0917 = 0.6155
        assert_eq!(value_score(-110).unwrap(), 62);
        // 0.6667 + 0.1667 = 0.8333
        assert_eq!(value_score(-200).unwrap(), 83);
    }

    #[test]
    fn test_value_score_caps_at_100() {
        // 0.8 + 0.25 > 1
        assert_eq!(value_score(-400).unwrap(), 100);
        assert_eq!(value_score(-10_000).unwrap(), 100);
    }

    #[test]
    fn test_value_score_rejects_invalid_odds() {
        assert!(value_score(0).is_err());
        assert!(value_score(-50).is_err());
    }

    #[test]
    fn test_value_score_vs_baseline() {
        // Estimate equals market -> neutral
        assert_eq!(value_score_vs_baseline(0.5, 100).unwrap(), 50);
        // +10% efficiency -> 75
        assert_eq!(value_score_vs_baseline(0.5, 150).unwrap(), 75);
        // Large edges clamp
        assert_eq!(value_score_vs_baseline(1.0, 400).unwrap(), 100);
        assert_eq!(value_score_vs_baseline(0.0, -400).unwrap(), 0);
    }

    #[test]
    fn test_value_score_vs_baseline_rejects_bad_probability() {
        assert!(value_score_vs_baseline(1.5, 100).is_err());
        assert!(value_score_vs_baseline(0.5, 10).is_err());
    }

    #[test]
    fn test_score_leg_falls_back_without_estimate() {
        assert_eq!(score_leg(150, None).unwrap(), value_score(150).unwrap());
        assert_eq!(
            score_leg(150, Some(0.5)).unwrap(),
            value_score_vs_baseline(0.5, 150).unwrap()
        );
    }
}
