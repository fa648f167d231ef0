//! Odds and parlay valuation engine

pub mod ev;
pub mod odds;
pub mod parlay;
pub mod picks;
pub mod selector;
pub mod value;

// Re-export commonly used types
pub use ev::{combo_ev, leg_ev, value_leg};
pub use odds::{american_to_decimal, decimal_to_american, implied_probability};
pub use parlay::{combine, Combo};
pub use picks::{picks_feed, Pick};
pub use selector::{
    best_sgp_for_slate, rank_legs, select_best_sgp, MatchupSelection, ProbabilityEstimates,
    RankedLeg, SelectorConfig, SgpSelection,
};
pub use value::{value_score, value_score_vs_baseline};
