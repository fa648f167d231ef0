//! Picks feed
//!
//! One headline pick per game-level market. Selection and confidence are
//! derived from prices only, so the same snapshot always yields the same
//! feed. Confidence is a display score (implied probability as 0-100),
//! not a model estimate.

use serde::{Deserialize, Serialize};

use super::odds::implied_probability;
use crate::models::{Leg, LegKind};

/// One headline pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub kind: LegKind,
    pub leg: Leg,
    pub implied_probability: f64,
    pub confidence: u8,
}

fn priced<'a>(legs: &'a [Leg], kind: LegKind) -> Vec<(&'a Leg, f64)> {
    legs.iter()
        .filter(|l| l.kind == kind)
        .filter_map(|l| implied_probability(l.odds).ok().map(|p| (l, p)))
        .collect()
}

/// Highest implied probability; earlier legs win ties
fn most_likely<'a>(candidates: &[(&'a Leg, f64)]) -> Option<(&'a Leg, f64)> {
    let mut best: Option<(&Leg, f64)> = None;
    for &(leg, p) in candidates {
        if best.map_or(true, |(_, bp)| p > bp) {
            best = Some((leg, p));
        }
    }
    best
}

/// Smallest absolute handicap, then highest implied probability
fn tightest_spread<'a>(candidates: &[(&'a Leg, f64)]) -> Option<(&'a Leg, f64)> {
    let mut best: Option<(&Leg, f64)> = None;
    for &(leg, p) in candidates {
        let point = leg.meta.point.unwrap_or(0.0).abs();
        let better = match best {
            None => true,
            Some((b, bp)) => {
                let bpoint = b.meta.point.unwrap_or(0.0).abs();
                point < bpoint || (point == bpoint && p > bp)
            }
        };
        if better {
            best = Some((leg, p));
        }
    }
    best
}

fn to_pick(kind: LegKind, (leg, p): (&Leg, f64)) -> Pick {
    Pick {
        kind,
        leg: leg.clone(),
        implied_probability: p,
        confidence: (p * 100.0).round() as u8,
    }
}

/// Best moneyline, best spread and total play for one matchup's legs
///
/// A market needs at least two priced sides to produce a pick.
pub fn picks_feed(legs: &[Leg]) -> Vec<Pick> {
    let mut picks = Vec::with_capacity(3);

    let moneyline = priced(legs, LegKind::Moneyline);
    if moneyline.len() >= 2 {
        picks.extend(most_likely(&moneyline).map(|c| to_pick(LegKind::Moneyline, c)));
    }

    let spread = priced(legs, LegKind::Spread);
    if spread.len() >= 2 {
        picks.extend(tightest_spread(&spread).map(|c| to_pick(LegKind::Spread, c)));
    }

    let total = priced(legs, LegKind::Total);
    if total.len() >= 2 {
        picks.extend(most_likely(&total).map(|c| to_pick(LegKind::Total, c)));
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LegMeta;

    fn leg(id: &str, kind: LegKind, odds: i32, point: Option<f64>) -> Leg {
        Leg::new(id, id, odds, kind).with_meta(LegMeta {
            point,
            ..Default::default()
        })
    }

    #[test]
    fn test_picks_feed_full_matchup() {
        let legs = vec![
            leg("ML-A", LegKind::Moneyline, -180, None),
            leg("ML-B", LegKind::Moneyline, 155, None),
            leg("Spread-A", LegKind::Spread, -110, Some(-3.5)),
            leg("Spread-B", LegKind::Spread, -110, Some(3.5)),
            leg("Total-Over", LegKind::Total, -105, Some(47.5)),
            leg("Total-Under", LegKind::Total, -115, Some(47.5)),
        ];

        let picks = picks_feed(&legs);
        assert_eq!(picks.len(), 3);

        assert_eq!(picks[0].leg.id, "ML-A");
        assert_eq!(picks[0].confidence, 64);

        // Equal handicap and price: first listed side
        assert_eq!(picks[1].leg.id, "Spread-A");

        assert_eq!(picks[2].leg.id, "Total-Under");
        assert_eq!(picks[2].kind, LegKind::Total);
    }

    #[test]
    fn test_spread_pick_prefers_smallest_handicap() {
        let legs = vec![
            leg("Spread-A", LegKind::Spread, -120, Some(-7.0)),
            leg("Spread-B", LegKind::Spread, 100, Some(1.5)),
            leg("Spread-C", LegKind::Spread, -105, Some(-1.5)),
        ];
        let picks = picks_feed(&legs);
        assert_eq!(picks[0].leg.id, "Spread-C");
    }

    #[test]
    fn test_total_tie_takes_first() {
        let legs = vec![
            leg("Total-Over", LegKind::Total, -110, Some(220.5)),
            leg("Total-Under", LegKind::Total, -110, Some(220.5)),
        ];
        let picks = picks_feed(&legs);
        assert_eq!(picks[0].leg.id, "Total-Over");
    }

    #[test]
    fn test_single_sided_market_has_no_pick() {
        let legs = vec![
            leg("ML-A", LegKind::Moneyline, -180, None),
            leg("Prop-X-Over", LegKind::Prop, -110, Some(24.5)),
        ];
        assert!(picks_feed(&legs).is_empty());
    }

    #[test]
    fn test_picks_feed_is_deterministic() {
        let legs = vec![
            leg("Total-Over", LegKind::Total, -110, Some(47.5)),
            leg("Total-Under", LegKind::Total, -110, Some(47.5)),
        ];
        assert_eq!(picks_feed(&legs), picks_feed(&legs));
    }
}
