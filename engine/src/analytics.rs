//! Pool-wide pick statistics, recomputed from scratch on every refresh.
//!
//! Pools are class- or department-sized, so each pass is a plain scan over
//! entries × games with no incremental state.

use crate::scoring::{AnswerKey, PointTable, score_bracket};
use crate::{Entry, GameId, TeamKey};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

const TOP_CHAMPIONS: usize = 10;
const MOST_SPLIT: usize = 12;
const TOP_CONTRARIAN: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionShare {
    pub team: String,
    pub count: usize,
    /// Percent of entries, 0–100.
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickShare {
    pub team: String,
    pub count: usize,
    pub pct: f64,
}

/// How the pool picked one decided game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDistribution {
    pub game_id: String,
    /// Entries with a pick for this game. The denominator for every pct here.
    pub total: usize,
    pub top: Option<PickShare>,
    pub second: Option<PickShare>,
    /// Binary entropy of the top two shares, in bits.
    pub entropy: f64,
    pub correct: TeamKey,
    pub correct_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrarianRow {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub score: u32,
    /// Sum over the entry's picks of `1 - share of the pool making that pick`.
    pub uniqueness: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolAnalytics {
    /// Entries with at least one pick.
    pub entry_count: usize,
    pub average_score: f64,
    pub champions: Vec<ChampionShare>,
    /// One per decided game, in answer-key order.
    pub games: Vec<GameDistribution>,
    pub most_split: Vec<GameDistribution>,
    pub contrarian: Vec<ContrarianRow>,
}

/// `-p1·log2(p1) - p2·log2(p2)`, with zero shares contributing nothing.
/// 0 for a unanimous game, 1 for an even two-way split.
pub fn binary_entropy(p1: f64, p2: f64) -> f64 {
    let h = |p: f64| if p <= 0.0 { 0.0 } else { -p * p.log2() };
    h(p1) + h(p2)
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 }
}

/// Per-game pick counts: game id → (team key → count, picks for the game).
#[derive(Debug, Default)]
struct PickCounts {
    games: HashMap<String, (HashMap<String, usize>, usize)>,
}

impl PickCounts {
    fn tally<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut games: HashMap<String, (HashMap<String, usize>, usize)> = HashMap::new();
        for entry in entries {
            for (game_id, pick) in &entry.picks {
                if pick.is_empty() {
                    continue;
                }
                let (counts, total) = games.entry(game_id.clone()).or_default();
                *counts.entry(pick.clone()).or_default() += 1;
                *total += 1;
            }
        }
        Self { games }
    }

    fn share(&self, game_id: &str, pick: &str) -> f64 {
        self.games
            .get(game_id)
            .and_then(|(counts, total)| counts.get(pick).map(|c| *c as f64 / *total as f64))
            .unwrap_or(0.0)
    }

    /// Picks for a game, most popular first; ties broken by team key.
    fn ranked(&self, game_id: &str) -> (Vec<(&str, usize)>, usize) {
        let Some((counts, total)) = self.games.get(game_id) else {
            return (Vec::new(), 0);
        };
        let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(k, c)| (k.as_str(), *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        (ranked, *total)
    }
}

impl PoolAnalytics {
    pub fn compute(entries: &[Entry], key: &AnswerKey, points: &PointTable) -> Self {
        let active: Vec<&Entry> = entries.iter().filter(|e| e.has_picks()).collect();
        let n = active.len();
        let counts = PickCounts::tally(active.iter().copied());

        let scores: Vec<u32> = active
            .iter()
            .map(|e| score_bracket(&e.picks, key, points).score)
            .collect();
        let average_score = if n == 0 {
            0.0
        } else {
            scores.iter().map(|s| f64::from(*s)).sum::<f64>() / n as f64
        };

        let champions = champion_distribution(&active);
        let games: Vec<GameDistribution> = key
            .iter()
            .map(|(id, correct)| game_distribution(&counts, &id.to_string(), correct))
            .collect();

        let mut most_split: Vec<GameDistribution> =
            games.iter().filter(|g| g.total > 0).cloned().collect();
        most_split.sort_by(|a, b| {
            b.entropy
                .partial_cmp(&a.entropy)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        most_split.truncate(MOST_SPLIT);

        let mut contrarian: Vec<ContrarianRow> = active
            .iter()
            .zip(&scores)
            .map(|(entry, score)| ContrarianRow {
                id: entry.id.clone(),
                name: entry.name.clone(),
                username: entry.username.clone(),
                score: *score,
                uniqueness: uniqueness(entry, &counts),
            })
            .collect();
        contrarian.sort_by(|a, b| {
            b.uniqueness
                .partial_cmp(&a.uniqueness)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| a.id.cmp(&b.id))
        });
        contrarian.truncate(TOP_CONTRARIAN);

        Self {
            entry_count: n,
            average_score,
            champions,
            games,
            most_split,
            contrarian,
        }
    }

    pub fn most_picked_champion(&self) -> Option<&ChampionShare> {
        self.champions.first()
    }
}

fn champion_distribution(entries: &[&Entry]) -> Vec<ChampionShare> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        if let Some(champ) = entry.champion_pick() {
            *counts.entry(champ).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_CHAMPIONS)
        .map(|(team, count)| ChampionShare {
            team: team.to_string(),
            count,
            pct: pct(count, entries.len()),
        })
        .collect()
}

fn game_distribution(counts: &PickCounts, game_id: &str, correct: &TeamKey) -> GameDistribution {
    let (ranked, total) = counts.ranked(game_id);
    let share = |slot: Option<&(&str, usize)>| {
        slot.map(|(team, count)| PickShare {
            team: team.to_string(),
            count: *count,
            pct: pct(*count, total),
        })
    };
    let top = share(ranked.first());
    let second = share(ranked.get(1));

    let proportion = |s: &Option<PickShare>| s.as_ref().map_or(0.0, |s| s.count as f64 / total as f64);
    let entropy = binary_entropy(proportion(&top), proportion(&second));

    let correct_count = ranked
        .iter()
        .find(|(team, _)| correct == *team)
        .map_or(0, |(_, c)| *c);

    GameDistribution {
        game_id: game_id.to_string(),
        total,
        top,
        second,
        entropy,
        correct: correct.clone(),
        correct_pct: pct(correct_count, total),
    }
}

/// Only picks on real games count; junk ids in a pick map are skipped.
fn uniqueness(entry: &Entry, counts: &PickCounts) -> f64 {
    entry
        .picks
        .iter()
        .filter(|(game_id, pick)| !pick.is_empty() && game_id.parse::<GameId>().is_ok())
        .map(|(game_id, pick)| 1.0 - counts.share(game_id, pick))
        .sum()
}
