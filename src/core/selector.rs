//! Best-Combo Selector
//!
//! Picks the strongest 2-3 leg same-game parlay from one matchup's legs:
//!
//! 1. Score each leg (efficiency form when an estimate is supplied)
//! 2. composite = value_score * 0.7 + implied_probability * 100 * 0.3
//! 3. Sort by composite, ties keep normalized order
//! 4. Drop legs outside the odds window (-800..=+400)
//! 5. Take the top 2, add the next leg only if its value score >= 65
//!
//! Weights, window and threshold are policy knobs in `SelectorConfig`,
//! not derived constants. Everything is deterministic.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::odds::implied_probability;
use super::parlay::combine;
use super::value::{score_leg, value_score};
use crate::data::normalizer::normalize_matchup;
use crate::error::LoadError;
use crate::models::{ComboPricing, Leg, Matchup};

/// Independent hit probability per leg id
pub type ProbabilityEstimates = HashMap<String, f64>;

/// Tunable selection policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Weight of the 0-100 value score in the composite
    pub value_weight: f64,
    /// Weight of implied probability (as 0-100) in the composite
    pub probability_weight: f64,
    /// Shortest favorite price eligible for auto-selection
    pub min_odds: i32,
    /// Longest underdog price eligible for auto-selection
    pub max_odds: i32,
    /// Legs always taken when available
    pub base_legs: usize,
    /// Value score (0-100) the next leg needs to join
    pub third_leg_threshold: u8,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            value_weight: 0.7,
            probability_weight: 0.3,
            min_odds: -800,
            max_odds: 400,
            base_legs: 2,
            third_leg_threshold: 65,
        }
    }
}

impl SelectorConfig {
    /// Load overrides from JSON; omitted fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Whether a price falls inside the auto-selection window
    pub fn allows(&self, odds: i32) -> bool {
        odds >= self.min_odds && odds <= self.max_odds
    }

    pub fn composite(&self, value_score: u8, implied_probability: f64) -> f64 {
        value_score as f64 * self.value_weight
            + implied_probability * 100.0 * self.probability_weight
    }
}

/// A leg with the numbers it was ranked by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLeg {
    pub leg: Leg,
    pub value_score: u8,
    pub implied_probability: f64,
    pub composite: f64,
}

/// Outcome of a best-combo selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SgpSelection {
    pub legs: Vec<RankedLeg>,
    /// `None` when no leg qualified
    pub pricing: Option<ComboPricing>,
    /// round(combined hit probability * 100); a derived display score
    pub confidence: Option<u8>,
}

impl SgpSelection {
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn leg_ids(&self) -> Vec<&str> {
        self.legs.iter().map(|r| r.leg.id.as_str()).collect()
    }
}

/// Best selection for one matchup of a slate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupSelection {
    pub matchup_id: String,
    pub title: String,
    pub selection: SgpSelection,
}

fn rank_one(leg: &Leg, estimate: Option<f64>, config: &SelectorConfig) -> Option<RankedLeg> {
    let implied = match implied_probability(leg.odds) {
        Ok(p) => p,
        Err(e) => {
            warn!("Skipping leg {}: {}", leg.id, e);
            return None;
        }
    };

    let score = match score_leg(leg.odds, estimate) {
        Ok(score) => score,
        Err(e) => {
            warn!("Ignoring estimate for leg {}: {}", leg.id, e);
            value_score(leg.odds).ok()?
        }
    };

    Some(RankedLeg {
        leg: leg.clone(),
        value_score: score,
        implied_probability: implied,
        composite: config.composite(score, implied),
    })
}

/// Score and order every leg, without the odds window
pub fn rank_legs(
    legs: &[Leg],
    estimates: Option<&ProbabilityEstimates>,
    config: &SelectorConfig,
) -> Vec<RankedLeg> {
    let mut ranked: Vec<RankedLeg> = legs
        .iter()
        .filter_map(|leg| {
            let estimate = estimates.and_then(|e| e.get(&leg.id).copied());
            rank_one(leg, estimate, config)
        })
        .collect();

    // sort_by is stable: equal keys keep their input order
    ranked.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(Ordering::Equal)
            .then(a.leg.index.cmp(&b.leg.index))
    });
    ranked
}

/// Choose the best same-game parlay from one matchup's legs
///
/// Fewer than two qualifying legs is a valid result, down to an empty one.
pub fn select_best_sgp(
    legs: &[Leg],
    estimates: Option<&ProbabilityEstimates>,
    config: &SelectorConfig,
) -> SgpSelection {
    let ranked = rank_legs(legs, estimates, config);
    let total = ranked.len();

    let eligible: Vec<RankedLeg> = ranked
        .into_iter()
        .filter(|r| config.allows(r.leg.odds))
        .collect();
    if eligible.len() < total {
        debug!(
            "Excluded {} legs outside {}..={}",
            total - eligible.len(),
            config.min_odds,
            config.max_odds
        );
    }

    let mut picked: Vec<RankedLeg> = eligible.iter().take(config.base_legs).cloned().collect();
    if let Some(next) = eligible.get(config.base_legs) {
        if next.value_score >= config.third_leg_threshold {
            debug!("Adding {} (score {})", next.leg.id, next.value_score);
            picked.push(next.clone());
        }
    }

    let legs: Vec<Leg> = picked.iter().map(|r| r.leg.clone()).collect();
    let pricing = match combine(&legs) {
        Ok(pricing) => pricing,
        Err(e) => {
            warn!("Could not price selection: {}", e);
            None
        }
    };
    let confidence = pricing.map(|p| (p.combined_hit_prob * 100.0).round() as u8);

    SgpSelection {
        legs: picked,
        pricing,
        confidence,
    }
}

/// Best same-game parlay for every matchup, in slate order
///
/// Matchups are independent snapshots, so they are processed in parallel.
pub fn best_sgp_for_slate(matchups: &[Matchup], config: &SelectorConfig) -> Vec<MatchupSelection> {
    matchups
        .par_iter()
        .map(|matchup| {
            let legs = normalize_matchup(matchup);
            MatchupSelection {
                matchup_id: matchup.id.clone(),
                title: matchup.title(),
                selection: select_best_sgp(&legs, None, config),
            }
        })
        .collect()
}
