use crate::state::messages::NetworkResponse;
use chrono::{DateTime, Local};
use log::{error, info};
use pool_engine::{Entry, PoolAnalytics, Standings, Tournament};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    #[default]
    Standings,
    Analytics,
}

/// Watch-mode state: the static tournament plus the latest pool snapshot and
/// everything derived from it.
pub struct App {
    pub tournament: Tournament,
    pub view: View,
    pub entries: Vec<Entry>,
    pub standings: Standings,
    pub analytics: PoolAnalytics,
    pub last_updated: Option<DateTime<Local>>,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(tournament: Tournament, view: View) -> Self {
        Self {
            tournament,
            view,
            entries: Vec::new(),
            standings: Standings::default(),
            analytics: PoolAnalytics::default(),
            last_updated: None,
            last_error: None,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from the watch loop
    // -----------------------------------------------------------------------

    /// Returns whether the screen should be redrawn.
    pub fn handle_response(&mut self, response: NetworkResponse) -> bool {
        match response {
            NetworkResponse::EntriesLoaded { entries } => self.on_entries_loaded(entries),
            NetworkResponse::Error { message, retryable } => {
                let hint = if retryable { "will retry" } else { "not retryable" };
                error!("Network error ({hint}): {message}");
                self.on_error(message);
            }
        }
        true
    }

    /// Replace the snapshot wholesale and recompute.
    pub fn on_entries_loaded(&mut self, entries: Vec<Entry>) {
        let t = &self.tournament;
        self.standings = Standings::compute(&entries, &t.answer_key, &t.points);
        self.analytics = PoolAnalytics::compute(&entries, &t.answer_key, &t.points);
        info!("pool snapshot: {} entries", entries.len());
        self.entries = entries;
        self.last_updated = Some(Local::now());
        self.last_error = None;
    }

    /// The previous snapshot stays up; the next refresh corrects it.
    pub fn on_error(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_engine::TournamentConfig;

    fn app() -> App {
        let t = TournamentConfig::embedded()
            .and_then(TournamentConfig::into_tournament)
            .expect("embedded tournament");
        App::new(t, View::Standings)
    }

    fn entry(id: &str) -> Entry {
        Entry {
            id: id.into(),
            name: format!("Entry {id}"),
            username: None,
            locked: false,
            picks: [("FF_CHAMP".to_string(), "1|Florida".to_string())].into_iter().collect(),
        }
    }

    #[test]
    fn snapshot_replaces_previous_one() {
        let mut app = app();
        app.on_entries_loaded(vec![entry("1"), entry("2")]);
        assert_eq!(app.standings.rows.len(), 2);
        assert_eq!(app.analytics.entry_count, 2);

        app.on_entries_loaded(vec![entry("3")]);
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.standings.rows.len(), 1);
        assert_eq!(app.standings.rows[0].id, "3");
        assert!(app.last_updated.is_some());
    }

    #[test]
    fn error_keeps_last_snapshot() {
        let mut app = app();
        app.on_entries_loaded(vec![entry("1")]);
        assert!(app.handle_response(NetworkResponse::Error {
            message: "Network error".into(),
            retryable: true,
        }));
        assert_eq!(app.standings.rows.len(), 1);
        assert_eq!(app.last_error.as_deref(), Some("Network error"));

        app.handle_response(NetworkResponse::EntriesLoaded { entries: vec![entry("1")] });
        assert!(app.last_error.is_none());
    }
}
