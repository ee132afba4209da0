use crate::{GameId, PickMap, RoundKind, TeamKey};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// Point table
// ---------------------------------------------------------------------------

/// Points awarded for a correct pick, per round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointTable(BTreeMap<RoundKind, u32>);

impl Default for PointTable {
    /// 1 / 2 / 4 / 8 / 16 / 32, doubling with each round.
    fn default() -> Self {
        Self(RoundKind::ALL.into_iter().zip([1, 2, 4, 8, 16, 32]).collect())
    }
}

impl PointTable {
    pub fn new(points: impl IntoIterator<Item = (RoundKind, u32)>) -> Self {
        Self(points.into_iter().collect())
    }

    /// Rounds missing from the table are worth nothing.
    pub fn points(&self, round: RoundKind) -> u32 {
        self.0.get(&round).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Answer key
// ---------------------------------------------------------------------------

/// Correct winner per decided game. A game missing from the key is not decided yet.
///
/// Updates arrive as a whole new key; nothing mutates a key in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey {
    games: BTreeMap<GameId, TeamKey>,
}

impl AnswerKey {
    /// Build from raw `game id → team key` results. Ids that don't name a
    /// game are dropped with a warning; they could never be scored anyway.
    pub fn from_results(results: &HashMap<String, String>) -> Self {
        let mut games = BTreeMap::new();
        for (raw_id, winner) in results {
            match raw_id.parse::<GameId>() {
                Ok(id) => {
                    games.insert(id, TeamKey::new(winner.clone()));
                }
                Err(e) => warn!("ignoring result: {e}"),
            }
        }
        Self { games }
    }

    pub fn insert(mut self, id: GameId, winner: TeamKey) -> Self {
        self.games.insert(id, winner);
        self
    }

    pub fn winner(&self, id: &GameId) -> Option<&TeamKey> {
        self.games.get(id)
    }

    /// Decided games in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&GameId, &TeamKey)> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BracketScore {
    pub score: u32,
    /// Points available across every decided game so far.
    pub possible: u32,
    pub correct_games: u32,
}

/// Score a pick map against the answer key.
///
/// Only decided games count, so `possible` grows as results come in. A
/// missing or mismatched pick just doesn't score.
pub fn score_bracket(picks: &PickMap, key: &AnswerKey, points: &PointTable) -> BracketScore {
    let mut out = BracketScore::default();

    for (id, winner) in key.iter() {
        let pts = points.points(id.round());
        out.possible += pts;

        if picks.get(&id.to_string()).is_some_and(|pick| winner == pick) {
            out.score += pts;
            out.correct_games += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key_of(pairs: &[(&str, &str)]) -> AnswerKey {
        let raw: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AnswerKey::from_results(&raw)
    }

    fn picks_of(pairs: &[(&str, &str)]) -> PickMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn single_game_match_and_miss() {
        let key = key_of(&[("South_64_g1", "1|Auburn")]);
        let table = PointTable::new([(RoundKind::First, 1)]);

        let hit = score_bracket(&picks_of(&[("South_64_g1", "1|Auburn")]), &key, &table);
        assert_eq!(hit, BracketScore { score: 1, possible: 1, correct_games: 1 });

        let miss = score_bracket(&picks_of(&[("South_64_g1", "16|Alabama State")]), &key, &table);
        assert_eq!(miss, BracketScore { score: 0, possible: 1, correct_games: 0 });
    }

    #[test]
    fn points_follow_the_round() {
        let key = key_of(&[
            ("West_32_0", "1|Florida"),
            ("West_S16_0", "1|Florida"),
            ("West_E8_0", "1|Florida"),
            ("FF_SEMI_1", "1|Florida"),
            ("FF_CHAMP", "1|Florida"),
        ]);
        let picks = picks_of(&[
            ("West_32_0", "1|Florida"),
            ("West_S16_0", "1|Florida"),
            ("West_E8_0", "8|UConn"),
            ("FF_SEMI_1", "1|Florida"),
            ("FF_CHAMP", "1|Florida"),
        ]);
        let s = score_bracket(&picks, &key, &PointTable::default());
        assert_eq!(s.possible, 2 + 4 + 8 + 16 + 32);
        assert_eq!(s.score, 2 + 4 + 16 + 32);
        assert_eq!(s.correct_games, 4);
    }

    #[test]
    fn empty_key_scores_nothing() {
        let picks = picks_of(&[("South_64_g1", "1|Auburn")]);
        let s = score_bracket(&picks, &AnswerKey::default(), &PointTable::default());
        assert_eq!(s, BracketScore::default());
    }

    #[test]
    fn unrecognized_result_ids_are_dropped() {
        let key = key_of(&[("South_64_g1", "1|Auburn"), ("bogus", "1|Auburn"), ("South_64_0", "x")]);
        assert_eq!(key.len(), 1);
        let s = score_bracket(&PickMap::new(), &key, &PointTable::default());
        assert_eq!(s.possible, 1);
    }

    #[test]
    fn point_table_deserializes_from_round_tokens() {
        let table: PointTable =
            serde_json::from_str(r#"{"64":1,"32":2,"S16":4,"E8":8,"FF":16,"CHAMP":32}"#).unwrap();
        assert_eq!(table, PointTable::default());
        assert_eq!(PointTable::new([(RoundKind::First, 1)]).points(RoundKind::Elite8), 0);
    }

    fn arb_key() -> impl Strategy<Value = Vec<(usize, u8)>> {
        prop::collection::vec((0usize..8, 1u8..=16), 0..8)
    }

    proptest! {
        #[test]
        fn possible_ignores_picks(results in arb_key(), picks in prop::collection::hash_map("[A-Za-z_0-9]{1,12}", "[0-9]{1,2}\\|[A-Za-z]{1,6}", 0..10)) {
            let mut key = AnswerKey::default();
            for (idx, seed) in &results {
                key = key.insert(GameId::regional("South", RoundKind::First, *idx), TeamKey::new(format!("{seed}|T")));
            }
            let expected = key.len() as u32; // every round-of-64 result is worth 1
            let s = score_bracket(&picks, &key, &PointTable::default());
            prop_assert_eq!(s.possible, expected);
            prop_assert!(s.score <= s.possible);
        }

        #[test]
        fn adding_a_correct_pick_never_lowers_the_score(
            results in arb_key(),
            base in prop::collection::hash_map("East_64_g[1-8]", "(1[0-6]|[1-9])\\|T", 0..8),
            extra in 0usize..8,
        ) {
            let mut key = AnswerKey::default();
            for (idx, seed) in &results {
                key = key.insert(GameId::regional("East", RoundKind::First, *idx), TeamKey::new(format!("{seed}|T")));
            }
            let mut picks: PickMap = base;
            let before = score_bracket(&picks, &key, &PointTable::default());

            let id = GameId::regional("East", RoundKind::First, extra);
            let already_right = match (key.winner(&id), picks.get(&id.to_string())) {
                (Some(winner), Some(pick)) => winner == pick,
                _ => false,
            };
            if let Some(winner) = key.winner(&id) {
                picks.insert(id.to_string(), winner.to_string());
            }
            let after = score_bracket(&picks, &key, &PointTable::default());
            prop_assert!(after.score >= before.score);
            prop_assert!(after.correct_games >= before.correct_games);
            if key.winner(&id).is_some() && !already_right {
                prop_assert_eq!(after.score, before.score + 1);
            }
        }
    }
}
