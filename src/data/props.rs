//! Lenient parsing of raw player-prop records
//!
//! Upstream prop feeds disagree on field names and price formats. Each
//! field accepts several aliases (first present wins), and prices are read
//! from numbers or from strings such as "+105", "Over -115" or "N/A".
//! Anything unusable becomes `None` instead of an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::warn;

const PLAYER_KEYS: &[&str] = &["player", "name"];
const CATEGORY_KEYS: &[&str] = &["category", "market"];
const STAT_KEYS: &[&str] = &["propName", "stat", "label"];
const LINE_KEYS: &[&str] = &["line", "point", "total"];
const OVER_KEYS: &[&str] = &["over", "overOdds"];
const UNDER_KEYS: &[&str] = &["under", "underOdds"];

/// Validated prop record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropRecord {
    pub player: Option<String>,
    pub category: Option<String>,
    pub stat: Option<String>,
    pub line: Option<f64>,
    /// American odds of the Over side, if it parsed
    pub over: Option<i32>,
    /// American odds of the Under side, if it parsed
    pub under: Option<i32>,
}

impl PropRecord {
    /// Stat name for labels, falling back to the category
    pub fn stat_label(&self) -> Option<&str> {
        self.stat.as_deref().or(self.category.as_deref())
    }
}

fn integer_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([+-]?\d+)(?:\.\d+)?$").unwrap())
}

fn number_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").unwrap())
}

/// First key whose value is present and non-null
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_present(obj, keys)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a price value into integer American odds
///
/// Non-numeric tokens are discarded; the first integer token wins.
///
/// # Examples
/// ```
/// use parlay::data::props::parse_price;
/// use serde_json::json;
///
/// assert_eq!(parse_price(&json!(-120)), Some(-120));
/// assert_eq!(parse_price(&json!("Over +105")), Some(105));
/// assert_eq!(parse_price(&json!("N/A")), None);
/// ```
pub fn parse_price(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                let f = n.as_f64()?.trunc();
                (f >= i32::MIN as f64 && f <= i32::MAX as f64).then(|| f as i32)
            }
        }
        Value::String(s) => s.split_whitespace().find_map(|token| {
            let caps = integer_token().captures(token)?;
            caps[1].parse::<i32>().ok()
        }),
        _ => None,
    }
}

/// Parse a line value ("24.5", 24.5, "o24.5")
pub fn parse_line(value: &Value) -> Option<f64> {
    let line = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => number_token().find(s)?.as_str().parse::<f64>().ok()?,
        _ => return None,
    };
    line.is_finite().then_some(line)
}

/// Parse one raw record
///
/// Returns `None` for non-objects and for records with nothing to label
/// them by (no player, stat or category).
pub fn parse_prop_record(value: &Value) -> Option<PropRecord> {
    let obj = value.as_object()?;

    let player = text_field(obj, PLAYER_KEYS);
    let category = text_field(obj, CATEGORY_KEYS);
    let stat = text_field(obj, STAT_KEYS);
    if player.is_none() && category.is_none() && stat.is_none() {
        return None;
    }

    Some(PropRecord {
        player,
        category,
        stat,
        line: first_present(obj, LINE_KEYS).and_then(parse_line),
        over: first_present(obj, OVER_KEYS).and_then(parse_price),
        under: first_present(obj, UNDER_KEYS).and_then(parse_price),
    })
}

/// Parse a batch, dropping malformed records
pub fn parse_props(values: &[Value]) -> Vec<PropRecord> {
    values
        .iter()
        .filter_map(|value| {
            let record = parse_prop_record(value);
            if record.is_none() {
                warn!("Dropping malformed prop record: {}", value);
            }
            record
        })
        .collect()
}
