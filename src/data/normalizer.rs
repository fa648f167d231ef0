//! Market Normalizer
//!
//! Flattens a matchup's moneyline, spread and total markets plus its player
//! props into one ordered list of legs. Leg ids are built from type,
//! participant and line, so normalizing the same snapshot twice gives the
//! same ids.

use std::collections::HashSet;
use tracing::warn;

use super::props::{parse_props, PropRecord};
use crate::core::odds::no_vig_probabilities;
use crate::error::validate_american;
use crate::models::{Leg, LegKind, LegMeta, Market, MarketKind, Matchup, Side};

/// Display form of a spread/total line: "+3.5", "-7", "0"
pub fn format_point(point: f64) -> String {
    // Avoid "-0"
    let point = if point == 0.0 { 0.0 } else { point };
    if point > 0.0 {
        format!("+{}", point)
    } else {
        format!("{}", point)
    }
}

/// Spread display with pick'em for a missing point
pub fn format_spread(point: Option<f64>) -> String {
    match point {
        Some(p) => format_point(p),
        None => "PK".to_string(),
    }
}

fn format_line(line: f64) -> String {
    let line = if line == 0.0 { 0.0 } else { line };
    format!("{}", line)
}

/// Keep legs whose odds are valid American odds, warning about the rest
fn retain_priced(legs: Vec<Leg>) -> Vec<Leg> {
    legs.into_iter()
        .filter(|leg| match validate_american(leg.odds) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping leg {}: {}", leg.id, e);
                false
            }
        })
        .collect()
}

/// De-vig a set of mutually exclusive legs against each other
fn attach_fair_probabilities(legs: &mut [&mut Leg]) {
    let prices: Vec<i32> = legs.iter().map(|l| l.odds).collect();
    if let Ok(Some(fair)) = no_vig_probabilities(&prices) {
        for (leg, p) in legs.iter_mut().zip(fair) {
            leg.fair_probability = Some(p);
        }
    }
}

/// Spread sides only complement each other at the same handicap
fn attach_spread_fair_probabilities(legs: &mut [Leg]) {
    let mut handicaps: Vec<f64> = Vec::new();
    for leg in legs.iter() {
        let handicap = leg.meta.point.unwrap_or(0.0).abs();
        if !handicaps.contains(&handicap) {
            handicaps.push(handicap);
        }
    }

    for handicap in handicaps {
        let mut pair: Vec<&mut Leg> = legs
            .iter_mut()
            .filter(|l| l.meta.point.unwrap_or(0.0).abs() == handicap)
            .collect();
        if pair.len() == 2 {
            attach_fair_probabilities(&mut pair);
        }
    }
}

/// Fair probabilities for one market's surviving legs
///
/// Moneyline outcomes are mutually exclusive as a whole. Spreads pair up
/// per handicap. Totals and props need exactly one Over and one Under.
fn attach_market_fair_probabilities(legs: &mut [Leg], kind: LegKind) {
    match kind {
        LegKind::Moneyline => {
            let mut all: Vec<&mut Leg> = legs.iter_mut().collect();
            attach_fair_probabilities(&mut all);
        }
        LegKind::Spread => attach_spread_fair_probabilities(legs),
        LegKind::Total | LegKind::Prop => {
            let over_under = legs.len() == 2
                && legs[0].meta.side.is_some()
                && legs[0].meta.side != legs[1].meta.side;
            if over_under {
                let mut pair: Vec<&mut Leg> = legs.iter_mut().collect();
                attach_fair_probabilities(&mut pair);
            }
        }
    }
}

fn market_legs(market: &Market, kind: MarketKind) -> Vec<Leg> {
    // Both sides of a total share the first outcome's line
    let total_line = market.outcomes.first().and_then(|o| o.point);

    let legs = market
        .outcomes
        .iter()
        .filter_map(|o| {
            let Some(price) = o.price else {
                warn!("Dropping {:?} outcome {}: no usable price", kind, o.name);
                return None;
            };
            Some((o, price))
        })
        .map(|(o, price)| match kind {
            MarketKind::Moneyline => Leg::new(
                format!("ML-{}", o.name),
                format!("{} ML", o.name),
                price,
                LegKind::Moneyline,
            )
            .with_meta(LegMeta {
                team: Some(o.name.clone()),
                ..Default::default()
            }),
            MarketKind::Spread => {
                let shown = format_spread(o.point);
                Leg::new(
                    format!("Spread-{}-{}", o.name, shown),
                    format!("{} {}", o.name, shown),
                    price,
                    LegKind::Spread,
                )
                .with_meta(LegMeta {
                    team: Some(o.name.clone()),
                    point: Some(o.point.unwrap_or(0.0)),
                    ..Default::default()
                })
            }
            MarketKind::Total => {
                let (id, label) = match total_line {
                    Some(line) => (
                        format!("Total-{}-{}", o.name, format_line(line)),
                        format!("{} {}", o.name, format_line(line)),
                    ),
                    None => (format!("Total-{}", o.name), o.name.clone()),
                };
                Leg::new(id, label, price, LegKind::Total).with_meta(LegMeta {
                    point: total_line,
                    side: Side::from_name(&o.name),
                    ..Default::default()
                })
            }
        })
        .collect();

    retain_priced(legs)
}

fn prop_legs(record: &PropRecord) -> Vec<Leg> {
    let stat = record.stat_label();
    let line = record.line.map(format_line);

    let mut legs = Vec::with_capacity(2);
    for (side, price) in [(Side::Over, record.over), (Side::Under, record.under)] {
        // A side without a usable price simply has no market
        let Some(price) = price else { continue };

        let id_parts: Vec<&str> = [record.player.as_deref(), stat, line.as_deref()]
            .into_iter()
            .flatten()
            .chain([side.as_str()])
            .collect();
        let label_parts: Vec<&str> = [record.player.as_deref(), stat]
            .into_iter()
            .flatten()
            .chain([side.as_str()])
            .chain(line.as_deref())
            .collect();

        legs.push(
            Leg::new(
                format!("Prop-{}", id_parts.join("-")),
                label_parts.join(" "),
                price,
                LegKind::Prop,
            )
            .with_meta(LegMeta {
                player: record.player.clone(),
                stat: stat.map(str::to_string),
                point: record.line,
                side: Some(side),
                ..Default::default()
            }),
        );
    }

    retain_priced(legs)
}

/// Keep the first leg per id across the whole matchup
fn drop_duplicates(legs: Vec<Leg>, seen: &mut HashSet<String>, matchup_id: &str) -> Vec<Leg> {
    legs.into_iter()
        .filter(|leg| {
            let fresh = seen.insert(leg.id.clone());
            if !fresh {
                warn!("Dropping duplicate leg {} in matchup {}", leg.id, matchup_id);
            }
            fresh
        })
        .collect()
}

/// Normalize a matchup's markets and already-parsed props
pub fn normalize(matchup: &Matchup, props: &[PropRecord]) -> Vec<Leg> {
    let mut seen = HashSet::new();
    let mut legs = Vec::new();

    // Dedupe before de-vig
    for kind in [MarketKind::Moneyline, MarketKind::Spread, MarketKind::Total] {
        if let Some(market) = matchup.market(kind) {
            let mut group = drop_duplicates(market_legs(market, kind), &mut seen, &matchup.id);
            attach_market_fair_probabilities(&mut group, kind.into());
            legs.extend(group);
        }
    }
    for record in props {
        let mut group = drop_duplicates(prop_legs(record), &mut seen, &matchup.id);
        attach_market_fair_probabilities(&mut group, LegKind::Prop);
        legs.extend(group);
    }

    for (index, leg) in legs.iter_mut().enumerate() {
        leg.index = index;
    }
    legs
}

/// Normalize a matchup including the raw props embedded in it
pub fn normalize_matchup(matchup: &Matchup) -> Vec<Leg> {
    let props = parse_props(&matchup.props);
    normalize(matchup, &props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::odds::implied_probability;
    use serde_json::json;

    fn sample_matchup() -> Matchup {
        serde_json::from_value(json!({
            "id": "nfl-1",
            "homeTeam": "Kansas City Chiefs",
            "awayTeam": "Miami Dolphins",
            "h2h": {"outcomes": [
                {"name": "Kansas City Chiefs", "price": -180},
                {"name": "Miami Dolphins", "price": 155}
            ]},
            "spreads": {"outcomes": [
                {"name": "Kansas City Chiefs", "price": -110, "point": -3.5},
                {"name": "Miami Dolphins", "price": -110, "point": 3.5}
            ]},
            "totals": {"outcomes": [
                {"name": "Over", "price": -105, "point": 47.5},
                {"name": "Under", "price": -115, "point": 47.5}
            ]},
            "props": [
                {"player": "Sample QB", "propName": "Passing Yards", "line": 269.5,
                 "over": -115, "under": -105}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_full_matchup() {
        let legs = normalize_matchup(&sample_matchup());
        let ids: Vec<&str> = legs.iter().map(|l| l.id.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "ML-Kansas City Chiefs",
                "ML-Miami Dolphins",
                "Spread-Kansas City Chiefs--3.5",
                "Spread-Miami Dolphins-+3.5",
                "Total-Over-47.5",
                "Total-Under-47.5",
                "Prop-Sample QB-Passing Yards-269.5-Over",
                "Prop-Sample QB-Passing Yards-269.5-Under",
            ]
        );
        for (i, leg) in legs.iter().enumerate() {
            assert_eq!(leg.index, i);
        }
    }

    #[test]
    fn test_moneyline_legs() {
        let legs = normalize_matchup(&sample_matchup());
        assert_eq!(legs[0].label, "Kansas City Chiefs ML");
        assert_eq!(legs[0].kind, LegKind::Moneyline);
        assert_eq!(legs[0].meta.team.as_deref(), Some("Kansas City Chiefs"));
        assert_eq!(legs[1].odds, 155);
    }

    #[test]
    fn test_spread_labels() {
        let legs = normalize_matchup(&sample_matchup());
        assert_eq!(legs[2].label, "Kansas City Chiefs -3.5");
        assert_eq!(legs[3].label, "Miami Dolphins +3.5");
        assert_eq!(legs[3].meta.point, Some(3.5));
    }

    #[test]
    fn test_spread_pickem() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "spreads": {"outcomes": [
                {"name": "Lakers", "price": -110},
                {"name": "Celtics", "price": -110}
            ]}
        }))
        .unwrap();

        let first = normalize_matchup(&matchup);
        assert!(first[0].label.ends_with("PK"));
        assert_eq!(first[0].label, "Lakers PK");
        assert_eq!(first[0].meta.point, Some(0.0));

        let second = normalize_matchup(&matchup);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_uses_first_outcome_line() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "totals": {"outcomes": [
                {"name": "Over", "price": -110, "point": 221.5},
                {"name": "Under", "price": -110}
            ]}
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        assert_eq!(legs[0].label, "Over 221.5");
        assert_eq!(legs[1].label, "Under 221.5");
        assert_eq!(legs[1].meta.point, Some(221.5));
        assert_eq!(legs[1].meta.side, Some(Side::Under));
    }

    #[test]
    fn test_fair_probabilities_attached_per_market() {
        let legs = normalize_matchup(&sample_matchup());
        let spread_fair: f64 = legs[2..4].iter().filter_map(|l| l.fair_probability).sum();
        assert!((spread_fair - 1.0).abs() < 1e-12);
        assert!((legs[2].fair_probability.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_over_under_pairs_get_fair_probabilities() {
        let legs = normalize_matchup(&sample_matchup());

        for pair in [&legs[4..6], &legs[6..8]] {
            let sum: f64 = pair.iter().filter_map(|l| l.fair_probability).sum();
            assert!((sum - 1.0).abs() < 1e-12, "{}", pair[0].id);
        }

        // Prop Over -115 vs Under -105: the favorite keeps the larger share
        let over = legs[6].fair_probability.unwrap();
        let under = legs[7].fair_probability.unwrap();
        assert!(over > 0.5 && under < 0.5);
        assert!(over < implied_probability(-115).unwrap());
    }

    #[test]
    fn test_alternate_spreads_pair_per_handicap() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "spreads": {"outcomes": [
                {"name": "A", "price": -110, "point": -3.5},
                {"name": "B", "price": -110, "point": 3.5},
                {"name": "A", "price": 150, "point": -7.5},
                {"name": "B", "price": -180, "point": 7.5},
                {"name": "A", "price": 300, "point": -10.5}
            ]}
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        assert_eq!(legs.len(), 5);
        assert!((legs[0].fair_probability.unwrap() - 0.5).abs() < 1e-12);
        assert!((legs[1].fair_probability.unwrap() - 0.5).abs() < 1e-12);

        let alt: f64 = legs[2..4].iter().filter_map(|l| l.fair_probability).sum();
        assert!((alt - 1.0).abs() < 1e-12);

        // No complementary side at 10.5
        assert!(legs[4].fair_probability.is_none());
    }

    #[test]
    fn test_dropped_duplicate_does_not_skew_fair_probability() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "h2h": {"outcomes": [
                {"name": "A", "price": -130},
                {"name": "A", "price": -125},
                {"name": "B", "price": 110}
            ]}
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        assert_eq!(legs.len(), 2);

        let a = implied_probability(-130).unwrap();
        let b = implied_probability(110).unwrap();
        assert!((legs[0].fair_probability.unwrap() - a / (a + b)).abs() < 1e-12);
        assert!((legs[1].fair_probability.unwrap() - b / (a + b)).abs() < 1e-12);
    }

    #[test]
    fn test_unpriced_outcomes_dropped() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "h2h": {"outcomes": [
                {"name": "A"},
                {"name": "B", "price": "N/A"},
                {"name": "C", "price": -110.0},
                {"name": "D", "price": null},
                {"name": "E", "price": "+120"}
            ]}
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        let ids: Vec<&str> = legs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["ML-C", "ML-E"]);
        assert_eq!(legs[0].odds, -110);
        assert_eq!(legs[1].index, 1);
    }

    #[test]
    fn test_prop_with_one_unparseable_side() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "props": [{"player": "Sample Guard", "stat": "Points", "line": 24.5,
                       "over": "N/A", "under": -120}]
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].meta.side, Some(Side::Under));
        assert_eq!(legs[0].odds, -120);
        assert_eq!(legs[0].label, "Sample Guard Points Under 24.5");
        // Nothing to de-vig against
        assert!(legs[0].fair_probability.is_none());
    }

    #[test]
    fn test_invalid_odds_outcome_dropped() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "h2h": {"outcomes": [
                {"name": "A", "price": 50},
                {"name": "B", "price": -130}
            ]}
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].id, "ML-B");
        assert_eq!(legs[0].index, 0);
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        let matchup: Matchup = serde_json::from_value(json!({
            "id": "g",
            "h2h": {"outcomes": [
                {"name": "A", "price": -130},
                {"name": "A", "price": -125}
            ]}
        }))
        .unwrap();

        let legs = normalize_matchup(&matchup);
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].odds, -130);
    }

    #[test]
    fn test_empty_matchup() {
        let matchup = Matchup {
            id: "g".to_string(),
            ..Default::default()
        };
        assert!(normalize_matchup(&matchup).is_empty());
    }

    #[test]
    fn test_format_point() {
        assert_eq!(format_point(3.5), "+3.5");
        assert_eq!(format_point(-7.0), "-7");
        assert_eq!(format_point(0.0), "0");
        assert_eq!(format_point(-0.0), "0");
        assert_eq!(format_spread(None), "PK");
    }
}
