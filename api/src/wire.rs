//! Raw wire types for the pool service. Every field is optional on the wire;
//! these map to the engine's `Entry` and our `TournamentMeta` via the
//! `From` impls below.
use crate::TournamentMeta;
use chrono::DateTime;
use log::warn;
use pool_engine::{Entry, PickMap};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Ids come back as JSON strings or numbers depending on the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl Default for WireId {
    fn default() -> Self {
        WireId::Text(String::new())
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Text(s) => f.write_str(s),
            WireId::Number(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// `GET /entries` returns either a bare array or `{ "entries": [...] }`.
/// Elements stay raw so one malformed entry can't sink the whole list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EntriesResponse {
    List(Vec<Value>),
    Wrapped {
        #[serde(default)]
        entries: Vec<Value>,
    },
}

impl EntriesResponse {
    /// Entries that decode; the rest are logged and skipped.
    pub fn into_entries(self) -> Vec<Entry> {
        let raw = match self {
            EntriesResponse::List(entries) | EntriesResponse::Wrapped { entries } => entries,
        };
        raw.into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value::<WireEntry>(value) {
                Ok(entry) => Some(Entry::from(entry)),
                Err(e) => {
                    warn!("skipping malformed entry at index {i}: {e}");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireEntry {
    #[serde(default)]
    pub id: WireId,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub username: Option<Value>,
    /// `true`, `1` or `"true"` depending on the backend.
    #[serde(default)]
    pub locked: Option<Value>,
    /// `null` before the first save. Picks that aren't strings are dropped.
    #[serde(default)]
    pub bracket: Option<Value>,
}

fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

impl From<WireEntry> for Entry {
    fn from(raw: WireEntry) -> Self {
        let picks: PickMap = match raw.bracket {
            Some(Value::Object(games)) => games
                .into_iter()
                .filter_map(|(game, team)| match team {
                    Value::String(t) => Some((game, t)),
                    Value::Null => None,
                    other => {
                        warn!("dropping non-text pick {game}={other} on entry {}", raw.id);
                        None
                    }
                })
                .collect(),
            _ => PickMap::new(),
        };

        Entry {
            id: raw.id.to_string(),
            locked: truthy(raw.locked.as_ref()),
            name: text(raw.name).unwrap_or_default(),
            username: text(raw.username).filter(|u| !u.trim().is_empty()),
            picks,
        }
    }
}

/// `POST /entries` response.
#[derive(Debug, Default, Deserialize)]
pub struct CreatedEntry {
    #[serde(default)]
    pub id: WireId,
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct WireMeta {
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
}

impl From<WireMeta> for TournamentMeta {
    fn from(raw: WireMeta) -> Self {
        let deadline = raw.deadline.as_deref().and_then(|d| {
            DateTime::parse_from_rfc3339(d)
                .map_err(|e| warn!("ignoring unparseable deadline {d:?}: {e}"))
                .ok()
        });
        TournamentMeta {
            deadline,
            closed: raw.closed.unwrap_or(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error body. `detail` is a message string, or a list of validation
/// errors on some backends.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_detail(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
