use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while pricing a single outcome, leg or combo
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OddsError {
    /// American odds must be <= -100 or >= +100
    #[error("Invalid American odds: {0} (must be <= -100 or >= +100)")]
    InvalidAmerican(i32),

    /// Decimal odds must be finite and > 1
    #[error("Invalid decimal odds: {0} (must be > 1)")]
    InvalidDecimal(f64),

    #[error("Probability must be between 0 and 1, got {0}")]
    InvalidProbability(f64),

    #[error("Stake must be a non-negative finite amount, got {0}")]
    InvalidStake(f64),
}

/// Errors raised while reading a slate snapshot
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected snapshot layout: {0}")]
    Layout(String),

    #[error("No matchup with id {0:?} in snapshot")]
    UnknownMatchup(String),
}

/// Validation functions
pub fn validate_american(odds: i32) -> Result<(), OddsError> {
    if odds > -100 && odds < 100 {
        return Err(OddsError::InvalidAmerican(odds));
    }
    Ok(())
}

pub fn validate_decimal(decimal: f64) -> Result<(), OddsError> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(OddsError::InvalidDecimal(decimal));
    }
    Ok(())
}

pub fn validate_probability(prob: f64) -> Result<(), OddsError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(OddsError::InvalidProbability(prob));
    }
    Ok(())
}

pub fn validate_stake(stake: f64) -> Result<(), OddsError> {
    if !stake.is_finite() || stake < 0.0 {
        return Err(OddsError::InvalidStake(stake));
    }
    Ok(())
}
