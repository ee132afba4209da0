use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

/// March 19, 2026 12:00 PM ET.
const DEFAULT_DEADLINE: &str = "2026-03-19T12:00:00-04:00";

/// Entry deadline. After it passes, brackets lock and the countdown reads closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(DateTime<FixedOffset>);

impl Default for Deadline {
    fn default() -> Self {
        Self(DateTime::parse_from_rfc3339(DEFAULT_DEADLINE).unwrap_or_default())
    }
}

impl Deadline {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        now >= self.0
    }

    /// `"Entries close in 1d 2h 3m 4s"`, or `"Entries are closed"` once past.
    /// The day count is left out when it's zero.
    pub fn countdown_text(&self, now: DateTime<Utc>) -> String {
        let remaining = self.0.with_timezone(&Utc) - now;
        // Closed exactly when `is_closed` says so; the last partial second
        // still counts down as 0s.
        if remaining <= TimeDelta::zero() {
            return "Entries are closed".to_string();
        }
        let total = remaining.num_seconds();

        let days = total / 86_400;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;
        let seconds = total % 60;

        let mut parts = Vec::with_capacity(4);
        if days > 0 {
            parts.push(format!("{days}d"));
        }
        parts.push(format!("{hours}h"));
        parts.push(format!("{minutes}m"));
        parts.push(format!("{seconds}s"));

        format!("Entries close in {}", parts.join(" "))
    }
}
