//! Parlay Combiner
//!
//! ```text
//! combined_decimal = Π decimal(leg)
//! combined_american = american(combined_decimal)
//! combined_hit_prob = Π implied(leg)
//! ```
//!
//! The hit probability assumes the legs are independent. Correlated legs
//! (a team's moneyline and the same team's spread) are mis-estimated; no
//! correlation model is applied.

use serde::{Deserialize, Serialize};

use super::ev::combo_ev;
use super::odds::{american_to_decimal, decimal_to_american, implied_probability};
use crate::error::OddsError;
use crate::models::{ComboPricing, Leg};

/// Price a set of legs
///
/// Returns `Ok(None)` for an empty set: pricing is unavailable, not an error.
///
/// # Examples
/// ```
/// use parlay::core::parlay::combine;
/// use parlay::models::{Leg, LegKind};
///
/// let legs = vec![
///     Leg::new("Spread-A", "A -3.5", -110, LegKind::Spread),
///     Leg::new("Total-Over", "Over 47.5", -110, LegKind::Total),
/// ];
/// let pricing = combine(&legs).unwrap().unwrap();
/// assert!((pricing.combined_decimal - 3.6446).abs() < 0.001);
/// ```
pub fn combine(legs: &[Leg]) -> Result<Option<ComboPricing>, OddsError> {
    if legs.is_empty() {
        return Ok(None);
    }

    let mut decimal = 1.0;
    let mut hit_prob = 1.0;
    for leg in legs {
        decimal *= american_to_decimal(leg.odds)?;
        hit_prob *= implied_probability(leg.odds)?;
    }

    Ok(Some(ComboPricing {
        legs: legs.len(),
        combined_decimal: decimal,
        combined_american: decimal_to_american(decimal)?,
        combined_hit_prob: hit_prob,
    }))
}

/// A user's leg selection for one matchup
///
/// Legs are unique by `id`; insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    legs: Vec<Leg>,
}

impl Combo {
    pub fn new() -> Self {
        Self { legs: Vec::new() }
    }

    /// Build from legs, dropping repeated ids
    pub fn from_legs<I: IntoIterator<Item = Leg>>(legs: I) -> Self {
        let mut combo = Self::new();
        for leg in legs {
            combo.insert(leg);
        }
        combo
    }

    pub fn contains(&self, id: &str) -> bool {
        self.legs.iter().any(|l| l.id == id)
    }

    /// Add a leg; returns false if its id is already selected
    pub fn insert(&mut self, leg: Leg) -> bool {
        if self.contains(&leg.id) {
            return false;
        }
        self.legs.push(leg);
        true
    }

    /// Remove a leg by id, returning it if it was selected
    pub fn remove(&mut self, id: &str) -> Option<Leg> {
        let pos = self.legs.iter().position(|l| l.id == id)?;
        Some(self.legs.remove(pos))
    }

    /// Select the leg if absent, deselect it if present
    ///
    /// Returns true when the leg is selected afterwards.
    pub fn toggle(&mut self, leg: Leg) -> bool {
        if self.remove(&leg.id).is_some() {
            false
        } else {
            self.legs.push(leg);
            true
        }
    }

    pub fn clear(&mut self) {
        self.legs.clear();
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Current combined price, recomputed from the selected legs
    pub fn pricing(&self) -> Result<Option<ComboPricing>, OddsError> {
        combine(&self.legs)
    }

    /// EV of the current selection at `stake`, `None` when empty
    pub fn ev(&self, stake: f64) -> Result<Option<f64>, OddsError> {
        self.pricing()?
            .map(|pricing| combo_ev(&pricing, stake))
            .transpose()
    }
}
