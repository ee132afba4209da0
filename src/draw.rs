use crate::app::{App, View};
use chrono::{DateTime, Utc};
use pool_engine::{
    AnswerKey, BracketProgression, BracketScore, Entry, Game, GameDistribution, PickShare,
    PoolAnalytics, RoundKind, Standings,
};
use std::fmt::Write;

const NAME_WIDTH: usize = 24;

/// `"1|Duke"` → `"1. Duke"`. Anything without a seed is shown as-is.
pub fn team_label(key: &str) -> String {
    match key.split_once('|') {
        Some((seed, name)) => format!("{seed}. {name}"),
        None => key.to_string(),
    }
}

/// Truncate to `width` chars, marking the cut with `~`.
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

pub fn standings_table(standings: &Standings) -> String {
    if standings.is_empty() {
        return "No entries yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<NAME_WIDTH$}  {:<16}  {:>5}  {:>7}  {:>8}  {}",
        "Rank", "Name", "Username", "Score", "Correct", "Possible", "Locked"
    );
    for row in &standings.rows {
        let username = row.username.as_deref().map(|u| format!("@{u}")).unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:>4}  {:<NAME_WIDTH$}  {:<16}  {:>5}  {:>7}  {:>8}  {}",
            row.rank,
            fit(&row.name, NAME_WIDTH),
            fit(&username, 16),
            row.score.score,
            row.score.correct_games,
            row.score.possible,
            if row.locked { "yes" } else { "no" },
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

fn distribution_line(g: &GameDistribution) -> String {
    let share = |s: &Option<PickShare>| match s {
        Some(s) => format!("{} {:.1}%", team_label(&s.team), s.pct),
        None => "-".to_string(),
    };
    format!(
        "{:<14} {:<28} vs {:<28} H={:.2}  won: {} ({:.1}%)",
        g.game_id,
        share(&g.top),
        share(&g.second),
        g.entropy,
        team_label(g.correct.as_str()),
        g.correct_pct,
    )
}

pub fn analytics_report(analytics: &PoolAnalytics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Entries with picks: {}   Average score: {:.1}",
        analytics.entry_count, analytics.average_score
    );
    if analytics.entry_count == 0 {
        return out;
    }

    let _ = writeln!(out, "\nChampion picks");
    for (i, c) in analytics.champions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<28} {:>4}  {:>5.1}%",
            i + 1,
            team_label(&c.team),
            c.count,
            c.pct
        );
    }

    if !analytics.most_split.is_empty() {
        let _ = writeln!(out, "\nMost split games");
        for g in &analytics.most_split {
            let _ = writeln!(out, "  {}", distribution_line(g));
        }
    }

    if !analytics.contrarian.is_empty() {
        let _ = writeln!(out, "\nMost contrarian brackets");
        let _ = writeln!(out, "  {:<NAME_WIDTH$}  {:>5}  {:>10}", "Name", "Score", "Uniqueness");
        for row in &analytics.contrarian {
            let _ = writeln!(
                out,
                "  {:<NAME_WIDTH$}  {:>5}  {:>10.2}",
                fit(&row.name, NAME_WIDTH),
                row.score,
                row.uniqueness
            );
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Single bracket
// ---------------------------------------------------------------------------

fn game_line(game: &Game, entry: &Entry, key: &AnswerKey) -> String {
    let slot = |t: &Option<pool_engine::Team>| t.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "TBD".into());
    let id = game.id.to_string();
    let mut line = format!("{:<14} {:<24} vs {:<24}", id, slot(&game.team_a), slot(&game.team_b));

    if let Some(pick) = entry.picks.get(&id).filter(|p| !p.is_empty()) {
        let _ = write!(line, " pick: {}", team_label(pick));
        match key.winner(&game.id) {
            Some(winner) if winner == pick => line.push_str(" [correct]"),
            Some(_) => line.push_str(" [wrong]"),
            None => {}
        }
    }
    line.trim_end().to_string()
}

pub fn bracket_view(
    entry: &Entry,
    progression: &BracketProgression,
    key: &AnswerKey,
    score: &BracketScore,
) -> String {
    let mut out = String::new();
    let name = if entry.name.is_empty() { entry.id.as_str() } else { entry.name.as_str() };
    let _ = write!(out, "{name}");
    if let Some(u) = &entry.username {
        let _ = write!(out, " (@{u})");
    }
    let _ = writeln!(out, "  entry {}{}", entry.id, if entry.locked { "  [locked]" } else { "" });
    let _ = writeln!(
        out,
        "Score {}  possible {}  correct games {}",
        score.score, score.possible, score.correct_games
    );

    for region in &progression.regions {
        let _ = writeln!(out, "\n{}", region.name);
        for round in [RoundKind::First, RoundKind::Second, RoundKind::Sweet16, RoundKind::Elite8] {
            let _ = writeln!(out, "  {}", round.label());
            for game in region.round(round) {
                let _ = writeln!(out, "    {}", game_line(game, entry, key));
            }
        }
    }

    let ff = &progression.final_four;
    let _ = writeln!(out, "\n{}", RoundKind::FinalFour.label());
    for game in &ff.semifinals {
        let _ = writeln!(out, "    {}", game_line(game, entry, key));
    }
    let _ = writeln!(out, "  {}", RoundKind::Championship.label());
    let _ = writeln!(out, "    {}", game_line(&ff.championship, entry, key));
    let _ = writeln!(
        out,
        "\nChampion: {}",
        progression.champion().map(|t| t.to_string()).unwrap_or_else(|| "TBD".into())
    );
    out
}

// ---------------------------------------------------------------------------
// Watch mode
// ---------------------------------------------------------------------------

pub fn watch_screen(app: &App, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "March Madness {} pool  |  {}",
        app.tournament.year,
        app.tournament.deadline.countdown_text(now)
    );
    match app.last_updated {
        Some(at) => {
            let _ = writeln!(out, "Updated {}", at.format("%H:%M:%S"));
        }
        None => {
            let _ = writeln!(out, "Loading entries...");
        }
    }
    if let Some(err) = &app.last_error {
        let _ = writeln!(out, "! {err} (showing last good data)");
    }
    out.push('\n');

    if app.last_updated.is_some() {
        match app.view {
            View::Standings => out.push_str(&standings_table(&app.standings)),
            View::Analytics => out.push_str(&analytics_report(&app.analytics)),
        }
    }
    out
}
