use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::data::props::parse_price;

/// Market type of a game-level market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Moneyline,
    Spread,
    Total,
}

/// One priced side of a market (a team, Over/Under, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    /// American odds; `None` when the feed sent nothing usable
    #[serde(
        default,
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
}

/// Accept numbers, numeric strings ("+105", "-110.0") and junk ("N/A")
fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_price))
}

/// Ordered outcomes of one market for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

/// One matchup as handed over by the acquisition layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub id: String,
    #[serde(default, alias = "commence_time", skip_serializing_if = "Option::is_none")]
    pub commence_time: Option<DateTime<Utc>>,
    #[serde(default, alias = "home_team")]
    pub home_team: String,
    #[serde(default, alias = "away_team")]
    pub away_team: String,
    #[serde(default, alias = "moneyline", skip_serializing_if = "Option::is_none")]
    pub h2h: Option<Market>,
    #[serde(default, alias = "spread", skip_serializing_if = "Option::is_none")]
    pub spreads: Option<Market>,
    #[serde(default, alias = "total", skip_serializing_if = "Option::is_none")]
    pub totals: Option<Market>,
    /// Raw player-prop records, parsed leniently by `data::props`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<serde_json::Value>,
}

impl Matchup {
    pub fn market(&self, kind: MarketKind) -> Option<&Market> {
        match kind {
            MarketKind::Moneyline => self.h2h.as_ref(),
            MarketKind::Spread => self.spreads.as_ref(),
            MarketKind::Total => self.totals.as_ref(),
        }
    }

    /// "Away @ Home" display name
    pub fn title(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

/// Snapshot of every matchup fetched in one upstream pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slate {
    #[serde(default)]
    pub events: Vec<Matchup>,
}

/// Normalized leg type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    Moneyline,
    Spread,
    Total,
    Prop,
}

impl LegKind {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            LegKind::Moneyline => "ML",
            LegKind::Spread => "Spread",
            LegKind::Total => "Total",
            LegKind::Prop => "Prop",
        }
    }
}

impl From<MarketKind> for LegKind {
    fn from(kind: MarketKind) -> Self {
        match kind {
            MarketKind::Moneyline => LegKind::Moneyline,
            MarketKind::Spread => LegKind::Spread,
            MarketKind::Total => LegKind::Total,
        }
    }
}

/// Over/Under side of a total or prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Over,
    Under,
}

impl Side {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "over" | "o" => Some(Side::Over),
            "under" | "u" => Some(Side::Under),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Over => "Over",
            Side::Under => "Under",
        }
    }
}

/// Structured context behind a leg's label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

/// Market-agnostic selectable bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Stable within one matchup: type + participant + line
    pub id: String,
    pub label: String,
    /// American odds
    pub odds: i32,
    #[serde(rename = "type")]
    pub kind: LegKind,
    #[serde(default)]
    pub meta: LegMeta,
    /// Position in the normalized list, used for deterministic tie-breaks
    #[serde(default)]
    pub index: usize,
    /// De-vigged probability across the sides of the leg's market
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_probability: Option<f64>,
}

impl Leg {
    pub fn new(id: impl Into<String>, label: impl Into<String>, odds: i32, kind: LegKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            odds,
            kind,
            meta: LegMeta::default(),
            index: 0,
            fair_probability: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_meta(mut self, meta: LegMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Valuation attached to one leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegValuation {
    pub implied_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_probability: Option<f64>,
    /// 0-100
    pub value_score: u8,
    pub stake: f64,
    pub ev: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_ev: Option<f64>,
}

/// A leg together with its valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedLeg {
    pub leg: Leg,
    pub valuation: LegValuation,
}

/// Combined price of a non-empty set of legs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboPricing {
    pub legs: usize,
    pub combined_decimal: f64,
    pub combined_american: i64,
    /// Product of implied probabilities (independence assumption)
    pub combined_hit_prob: f64,
}
