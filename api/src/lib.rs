pub mod client;
pub mod wire;

pub use client::{ApiError, ApiResult, DEFAULT_BASE_URL, PoolApi};

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Domain types — request/response shapes independent of the wire format
// ---------------------------------------------------------------------------

/// Registration payload for a new pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    pub name: String,
    pub email: String,
    pub username: Option<String>,
}

impl NewEntry {
    /// A blank username is sent as `null`.
    pub fn new(name: impl Into<String>, email: impl Into<String>, username: Option<&str>) -> Self {
        Self {
            name: name.into().trim().to_owned(),
            email: email.into().trim().to_owned(),
            username: username
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Entry deadline as reported by the pool service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TournamentMeta {
    pub deadline: Option<DateTime<FixedOffset>>,
    pub closed: bool,
}

impl TournamentMeta {
    /// The service's `closed` flag wins; otherwise fall back to the deadline.
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.closed || self.deadline.is_some_and(|d| now >= d.with_timezone(&Utc))
    }
}
