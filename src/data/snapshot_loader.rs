//! Slate snapshot loading
//!
//! The acquisition layer writes one JSON document per fetch:
//!
//! ```json
//! { "events": [ { "id": "...", "homeTeam": "...", "h2h": {...}, "props": [...] } ] }
//! ```
//!
//! A bare array of matchups is accepted as well.

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::LoadError;
use crate::models::{Matchup, Slate};

/// Pull the matchup list out of either accepted layout
fn event_values(root: Value) -> Result<Vec<Value>, LoadError> {
    match root {
        Value::Array(events) => Ok(events),
        Value::Object(mut obj) => match obj.remove("events") {
            Some(Value::Array(events)) => Ok(events),
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(LoadError::Layout(format!(
                "\"events\" must be an array, got {}",
                other
            ))),
        },
        other => Err(LoadError::Layout(format!(
            "expected an object or an array, got {}",
            other
        ))),
    }
}

impl Slate {
    /// Parse a snapshot from a JSON string
    ///
    /// Matchups are decoded one at a time; a malformed matchup is skipped
    /// with a warning and the rest of the slate still loads.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let root: Value = serde_json::from_str(json)?;

        let events = event_values(root)?
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value::<Matchup>(value) {
                Ok(matchup) => Some(matchup),
                Err(e) => {
                    warn!("Skipping matchup #{} in snapshot: {}", i, e);
                    None
                }
            })
            .collect();

        Ok(Slate { events })
    }

    /// Look up a matchup by id
    pub fn matchup(&self, id: &str) -> Result<&Matchup, LoadError> {
        self.events
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| LoadError::UnknownMatchup(id.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Load a slate snapshot from a JSON file
pub fn load_slate<P: AsRef<Path>>(path: P) -> Result<Slate, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Slate::from_json_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "events": [
            {
                "id": "nba-1",
                "commenceTime": "2025-01-15T00:30:00Z",
                "homeTeam": "New York Knicks",
                "awayTeam": "Boston Celtics",
                "h2h": {"key": "h2h", "outcomes": [
                    {"name": "New York Knicks", "price": 120},
                    {"name": "Boston Celtics", "price": -140}
                ]},
                "props": [
                    {"player": "Sample Guard", "market": "Points", "line": 24.5,
                     "over": -115, "under": -105}
                ]
            },
            {"id": "nba-2", "homeTeam": "Lakers", "awayTeam": "Suns"}
        ]
    }"#;

    #[test]
    fn test_load_slate_from_json_string() {
        let slate = Slate::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(slate.events.len(), 2);
        assert_eq!(slate.events[0].props.len(), 1);
        assert!(!slate.is_empty());
    }

    #[test]
    fn test_load_slate_bare_array() {
        let slate = Slate::from_json_str(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(slate.events.len(), 2);
    }

    #[test]
    fn test_unpriced_outcome_does_not_sink_slate() {
        let json = r#"{"events": [
            {"id": "bad-prices", "homeTeam": "A", "awayTeam": "B",
             "h2h": {"outcomes": [
                {"name": "A"},
                {"name": "B", "price": "N/A"},
                {"name": "C", "price": -110.0}
             ]}},
            {"id": "clean", "homeTeam": "C", "awayTeam": "D",
             "h2h": {"outcomes": [
                {"name": "C", "price": -150},
                {"name": "D", "price": 130}
             ]}}
        ]}"#;

        let slate = Slate::from_json_str(json).unwrap();
        assert_eq!(slate.events.len(), 2);

        let outcomes = &slate.matchup("bad-prices").unwrap().h2h.as_ref().unwrap().outcomes;
        assert_eq!(outcomes[0].price, None);
        assert_eq!(outcomes[1].price, None);
        assert_eq!(outcomes[2].price, Some(-110));
        assert_eq!(slate.matchup("clean").unwrap().h2h.as_ref().unwrap().outcomes.len(), 2);
    }

    #[test]
    fn test_malformed_matchup_is_skipped() {
        let json = r#"[
            {"id": "broken", "h2h": 5},
            {"homeTeam": "no id"},
            {"id": "ok", "homeTeam": "Lakers", "awayTeam": "Suns"}
        ]"#;

        let slate = Slate::from_json_str(json).unwrap();
        assert_eq!(slate.events.len(), 1);
        assert_eq!(slate.events[0].id, "ok");
    }

    #[test]
    fn test_unexpected_layout() {
        assert!(matches!(
            Slate::from_json_str(r#"{"events": {"id": "a"}}"#),
            Err(LoadError::Layout(_))
        ));
        assert!(matches!(
            Slate::from_json_str("42"),
            Err(LoadError::Layout(_))
        ));
        assert!(Slate::from_json_str("{}").unwrap().is_empty());
    }

    #[test]
    fn test_matchup_lookup() {
        let slate = Slate::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(slate.matchup("nba-2").unwrap().home_team, "Lakers");
        assert!(matches!(
            slate.matchup("missing"),
            Err(LoadError::UnknownMatchup(_))
        ));
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(
            Slate::from_json_str("{not json"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_load_slate_missing_file() {
        let err = load_slate("/nonexistent/slate.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
