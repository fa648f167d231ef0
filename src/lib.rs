//! Parlay - odds and same-game parlay valuation engine
//!
//! This library provides:
//! - American / decimal odds conversion and implied probability
//! - A 0-100 value score per outcome
//! - Normalization of moneyline, spread, total and player-prop markets into legs
//! - Combined parlay pricing and expected value
//! - Deterministic best same-game parlay selection
//!
//! All operations are pure and synchronous. Fetching odds is left to the
//! caller, which hands over a snapshot.
//!
//! # Example
//!
//! ```no_run
//! use parlay::core::{select_best_sgp, SelectorConfig};
//! use parlay::data::{load_slate, normalize_matchup};
//!
//! let slate = load_slate("slate.json").unwrap();
//! let matchup = slate.matchup("nfl-1").unwrap();
//!
//! let legs = normalize_matchup(matchup);
//! let sgp = select_best_sgp(&legs, None, &SelectorConfig::default());
//! if let Some(pricing) = sgp.pricing {
//!     println!("Best SGP pays {}", pricing.combined_american);
//! }
//! ```

pub mod core;
pub mod data;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use error::{LoadError, OddsError};
pub use models::{
    ComboPricing, Leg, LegKind, LegMeta, LegValuation, Market, MarketKind, Matchup, Outcome,
    Side, Slate, ValuedLeg,
};
