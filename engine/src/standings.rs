use crate::Entry;
use crate::scoring::{AnswerKey, BracketScore, PointTable, score_bracket};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    /// Competition rank: tied scores share a rank and the next one skips ("1, 2, 2, 4").
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub locked: bool,
    pub score: BracketScore,
}

/// Live leaderboard over every entry, including ones with no picks yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Standings {
    pub rows: Vec<StandingRow>,
}

impl Standings {
    pub fn compute(entries: &[Entry], key: &AnswerKey, points: &PointTable) -> Self {
        let mut rows: Vec<StandingRow> = entries
            .iter()
            .map(|e| StandingRow {
                rank: 0,
                id: e.id.clone(),
                name: if e.name.is_empty() { e.id.clone() } else { e.name.clone() },
                username: e.username.clone(),
                locked: e.locked,
                score: score_bracket(&e.picks, key, points),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .score
                .cmp(&a.score.score)
                .then_with(|| b.score.correct_games.cmp(&a.score.correct_games))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut rank = 0;
        let mut prev_score = None;
        for (i, row) in rows.iter_mut().enumerate() {
            if prev_score != Some(row.score.score) {
                rank = i + 1;
                prev_score = Some(row.score.score);
            }
            row.rank = rank;
        }

        Self { rows }
    }

    pub fn leader(&self) -> Option<&StandingRow> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameId, RoundKind, TeamKey};

    fn entry(id: &str, name: &str, picks: &[(&str, &str)]) -> Entry {
        Entry {
            id: id.into(),
            name: name.into(),
            username: Some(format!("user{id}")),
            locked: id == "1",
            picks: picks.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    fn key() -> AnswerKey {
        AnswerKey::default()
            .insert(GameId::regional("East", RoundKind::First, 0), TeamKey::new("1|Duke"))
            .insert(GameId::regional("East", RoundKind::Second, 0), TeamKey::new("1|Duke"))
    }

    #[test]
    fn sorted_by_score_with_shared_ranks() {
        let entries = [
            entry("1", "Ann", &[("East_64_g1", "1|Duke")]),
            entry("2", "Bob", &[("East_64_g1", "1|Duke"), ("East_32_0", "1|Duke")]),
            entry("3", "Cal", &[]),
            entry("4", "Abe", &[("East_64_g1", "1|Duke")]),
        ];
        let s = Standings::compute(&entries, &key(), &PointTable::default());

        let order: Vec<(&str, usize, u32)> =
            s.rows.iter().map(|r| (r.name.as_str(), r.rank, r.score.score)).collect();
        assert_eq!(order, [("Bob", 1, 3), ("Abe", 2, 1), ("Ann", 2, 1), ("Cal", 4, 0)]);
        assert_eq!(s.leader().map(|r| r.id.as_str()), Some("2"));
        assert!(s.rows.iter().all(|r| r.score.possible == 3));
        assert!(s.rows.iter().find(|r| r.id == "1").is_some_and(|r| r.locked));
    }

    #[test]
    fn blank_names_fall_back_to_id() {
        let s = Standings::compute(&[entry("42", "", &[])], &key(), &PointTable::default());
        assert_eq!(s.rows[0].name, "42");
        assert_eq!(s.rows[0].rank, 1);
    }

    #[test]
    fn empty_pool() {
        let s = Standings::compute(&[], &key(), &PointTable::default());
        assert!(s.is_empty());
        assert!(s.leader().is_none());
    }
}
