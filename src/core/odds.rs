//! Odds Conversion
//!
//! Conversions between American odds, decimal odds and implied probability.
//!
//! American odds:
//!     +150 = win 150 on a 100 stake
//!     -150 = stake 150 to win 100
//!
//! Decimal odds:
//!     odds >= +100  ->  1 + odds / 100
//!     odds <= -100  ->  1 + 100 / |odds|
//!
//! Implied probability:
//!     odds >= +100  ->  100 / (odds + 100)
//!     odds <= -100  ->  |odds| / (|odds| + 100)
//!
//! American odds strictly between -100 and +100 do not exist by convention
//! and are rejected with `OddsError::InvalidAmerican`.

use crate::error::{validate_american, validate_decimal, OddsError};

/// Convert American odds to decimal odds
///
/// # Examples
/// ```
/// use parlay::core::odds::american_to_decimal;
/// let dec = american_to_decimal(-150).unwrap();
/// assert!((dec - 1.6667).abs() < 0.0001);
/// assert!(american_to_decimal(50).is_err());
/// ```
pub fn american_to_decimal(odds: i32) -> Result<f64, OddsError> {
    validate_american(odds)?;

    let odds = odds as f64;
    if odds >= 100.0 {
        Ok(1.0 + odds / 100.0)
    } else {
        Ok(1.0 + 100.0 / odds.abs())
    }
}

/// Convert decimal odds back to (rounded) American odds
///
/// Decimal 2.0 maps to +100, the even-money price. Long parlays run far
/// past the range of a single leg's price, so the result is `i64`; a
/// decimal whose price does not fit fails with `InvalidDecimal`.
///
/// # Examples
/// ```
/// use parlay::core::odds::decimal_to_american;
/// assert_eq!(decimal_to_american(1.6667).unwrap(), -150);
/// assert_eq!(decimal_to_american(2.5).unwrap(), 150);
/// ```
pub fn decimal_to_american(decimal: f64) -> Result<i64, OddsError> {
    validate_decimal(decimal)?;

    let american = if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round()
    } else {
        (-100.0 / (decimal - 1.0)).round()
    };

    if !(american.abs() < i64::MAX as f64) {
        return Err(OddsError::InvalidDecimal(decimal));
    }
    Ok(american as i64)
}

/// Win probability implied by an American price, strictly in (0, 1)
///
/// # Examples
/// ```
/// use parlay::core::odds::implied_probability;
/// assert!((implied_probability(-110).unwrap() - 0.5238).abs() < 0.0001);
/// assert!((implied_probability(150).unwrap() - 0.4).abs() < 0.0001);
/// ```
pub fn implied_probability(odds: i32) -> Result<f64, OddsError> {
    validate_american(odds)?;

    let odds = odds as f64;
    if odds >= 100.0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Ok(odds.abs() / (odds.abs() + 100.0))
    }
}

/// Bookmaker overround across the sides of one market
///
/// Sum of implied probabilities minus 1. A -110/-110 market holds ~4.76%.
pub fn market_hold(prices: &[i32]) -> Result<f64, OddsError> {
    let total: f64 = prices
        .iter()
        .map(|&p| implied_probability(p))
        .sum::<Result<f64, OddsError>>()?;
    Ok(total - 1.0)
}

/// Proportionally de-vigged probabilities for the sides of one market
///
/// Returns `None` for fewer than two sides, where there is nothing to
/// normalize against.
pub fn no_vig_probabilities(prices: &[i32]) -> Result<Option<Vec<f64>>, OddsError> {
    if prices.len() < 2 {
        return Ok(None);
    }

    let implied: Vec<f64> = prices
        .iter()
        .map(|&p| implied_probability(p))
        .collect::<Result<_, _>>()?;
    let total: f64 = implied.iter().sum();

    Ok(Some(implied.iter().map(|p| p / total).collect()))
}

/// Format American odds with an explicit sign for positive prices
pub fn format_american(odds: impl Into<i64>) -> String {
    let odds = odds.into();
    if odds > 0 {
        format!("+{}", odds)
    } else {
        odds.to_string()
    }
}
