use crate::structure::{Bracket, Game, Region};
use crate::{GameId, PickMap, RoundKind, Team, TeamKey};
use std::fmt;

impl Game {
    /// The picked winner of this game.
    ///
    /// Resolves only when both slots are known and the pick equals one of
    /// their team keys. A missing, stale or malformed pick is "unpicked".
    pub fn winner(&self, picks: &PickMap) -> Option<&Team> {
        let chosen = picks.get(&self.id.to_string())?;
        let (a, b) = (self.team_a.as_ref()?, self.team_b.as_ref()?);
        if a.key() == *chosen {
            Some(a)
        } else if b.key() == *chosen {
            Some(b)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Progression results
// ---------------------------------------------------------------------------

/// One region's bracket as implied by a pick map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionProgression {
    pub name: String,
    pub round64: Vec<Game>,
    pub round32: Vec<Game>,
    pub sweet16: Vec<Game>,
    pub elite8: Vec<Game>,
    pub champion: Option<Team>,
}

impl RegionProgression {
    /// Games for one regional round, or an empty slice for national rounds.
    pub fn round(&self, round: RoundKind) -> &[Game] {
        match round {
            RoundKind::First => &self.round64,
            RoundKind::Second => &self.round32,
            RoundKind::Sweet16 => &self.sweet16,
            RoundKind::Elite8 => &self.elite8,
            RoundKind::FinalFour | RoundKind::Championship => &[],
        }
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.round64
            .iter()
            .chain(&self.round32)
            .chain(&self.sweet16)
            .chain(&self.elite8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalFour {
    pub semifinals: [Game; 2],
    pub championship: Game,
    pub champion: Option<Team>,
}

impl FinalFour {
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.semifinals.iter().chain(std::iter::once(&self.championship))
    }
}

/// Every game of the tournament as implied by a pick map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketProgression {
    pub regions: Vec<RegionProgression>,
    pub final_four: FinalFour,
}

impl BracketProgression {
    /// All 63 games, region by region, then the national rounds.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.regions
            .iter()
            .flat_map(RegionProgression::games)
            .chain(self.final_four.games())
    }

    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games().find(|g| &g.id == id)
    }

    /// Games a user can pick right now: both slots are known.
    pub fn pickable_games(&self) -> impl Iterator<Item = &Game> {
        self.games().filter(|g| g.is_resolved())
    }

    pub fn champion(&self) -> Option<&Team> {
        self.final_four.champion.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Pairwise reduction
// ---------------------------------------------------------------------------

/// Derive a region's later rounds from its round of 64 and the picks.
pub fn progress_region(region: &Region, picks: &PickMap) -> RegionProgression {
    let round64 = region.round64.clone();
    let round32 = next_round(&region.name, RoundKind::Second, &round64, picks);
    let sweet16 = next_round(&region.name, RoundKind::Sweet16, &round32, picks);
    let elite8 = next_round(&region.name, RoundKind::Elite8, &sweet16, picks);
    let champion = elite8.first().and_then(|g| g.winner(picks)).cloned();

    RegionProgression {
        name: region.name.clone(),
        round64,
        round32,
        sweet16,
        elite8,
        champion,
    }
}

/// Game `i` of the new round is fed by the winners of games `2i` and `2i + 1`.
fn next_round(region: &str, round: RoundKind, prev: &[Game], picks: &PickMap) -> Vec<Game> {
    prev.chunks(2)
        .enumerate()
        .map(|(i, pair)| Game {
            id: GameId::regional(region, round, i),
            team_a: pair.first().and_then(|g| g.winner(picks)).cloned(),
            team_b: pair.get(1).and_then(|g| g.winner(picks)).cloned(),
        })
        .collect()
}

/// Resolve the national rounds from four region champions, in semifinal
/// order: `[0]` vs `[1]` in `FF_SEMI_1`, `[2]` vs `[3]` in `FF_SEMI_2`.
pub fn progress_final_four(champions: [Option<Team>; 4], picks: &PickMap) -> FinalFour {
    let [a, b, c, d] = champions;
    let semifinals = [
        Game { id: GameId::Semifinal(1), team_a: a, team_b: b },
        Game { id: GameId::Semifinal(2), team_a: c, team_b: d },
    ];

    let championship = Game {
        id: GameId::Championship,
        team_a: semifinals[0].winner(picks).cloned(),
        team_b: semifinals[1].winner(picks).cloned(),
    };
    let champion = championship.winner(picks).cloned();

    FinalFour { semifinals, championship, champion }
}

/// Full progression for the whole field. Holds no state between calls, so
/// rerun it whenever the picks change.
pub fn progress_bracket(bracket: &Bracket, picks: &PickMap) -> BracketProgression {
    let regions: Vec<RegionProgression> = bracket
        .regions
        .iter()
        .map(|r| progress_region(r, picks))
        .collect();

    let champ = |idx: usize| regions.get(idx).and_then(|r| r.champion.clone());
    let [[s1a, s1b], [s2a, s2b]] = bracket.semifinals;
    let final_four = progress_final_four([champ(s1a), champ(s1b), champ(s2a), champ(s2b)], picks);

    BracketProgression { regions, final_four }
}

impl Bracket {
    pub fn progress(&self, picks: &PickMap) -> BracketProgression {
        progress_bracket(self, picks)
    }
}

// ---------------------------------------------------------------------------
// Editing picks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    Locked,
    UnknownGame(String),
    Unresolved(GameId),
    NotInGame { game: GameId, team: TeamKey },
}

impl fmt::Display for PickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickError::Locked => write!(f, "bracket is locked"),
            PickError::UnknownGame(id) => write!(f, "no game {id} in this bracket"),
            PickError::Unresolved(id) => write!(f, "{id} is still waiting on earlier picks"),
            PickError::NotInGame { game, team } => write!(f, "{team} is not playing in {game}"),
        }
    }
}

impl std::error::Error for PickError {}

/// Record a pick for one game, checked against the current progression.
///
/// Picks downstream of a changed game are left as they are: if they no
/// longer match a live team they simply stop resolving.
pub fn set_pick(
    picks: &mut PickMap,
    locked: bool,
    bracket: &Bracket,
    game_id: &str,
    team: &TeamKey,
) -> Result<(), PickError> {
    if locked {
        return Err(PickError::Locked);
    }
    let id: GameId = game_id
        .parse()
        .map_err(|_| PickError::UnknownGame(game_id.to_string()))?;

    let progression = bracket.progress(picks);
    let game = progression
        .game(&id)
        .ok_or_else(|| PickError::UnknownGame(game_id.to_string()))?;
    if !game.is_resolved() {
        return Err(PickError::Unresolved(id));
    }
    if !game.teams().any(|t| t.key() == *team) {
        return Err(PickError::NotInGame { game: id, team: team.clone() });
    }

    picks.insert(id.to_string(), team.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use proptest::prelude::*;

    fn bracket() -> Bracket {
        TournamentConfig::embedded()
            .and_then(TournamentConfig::into_tournament)
            .expect("embedded tournament is valid")
            .bracket
    }

    fn picks_of(pairs: &[(&str, &str)]) -> PickMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_picks_leave_every_later_round_tbd() {
        let b = bracket();
        let p = b.progress(&PickMap::new());
        for region in &p.regions {
            assert!(region.round64.iter().all(Game::is_resolved));
            for game in region.round32.iter().chain(&region.sweet16).chain(&region.elite8) {
                assert_eq!(game.team_a, None);
                assert_eq!(game.team_b, None);
            }
            assert_eq!(region.champion, None);
        }
        assert!(p.final_four.games().all(|g| g.teams().next().is_none()));
        assert_eq!(p.champion(), None);
    }

    #[test]
    fn round_sizes_and_ids() {
        let p = bracket().progress(&PickMap::new());
        let south = &p.regions[0];
        assert_eq!(
            [south.round64.len(), south.round32.len(), south.sweet16.len(), south.elite8.len()],
            [8, 4, 2, 1]
        );
        assert_eq!(south.round32[3].id.to_string(), "South_32_3");
        assert_eq!(south.sweet16[1].id.to_string(), "South_S16_1");
        assert_eq!(south.elite8[0].id.to_string(), "South_E8_0");
        assert_eq!(p.games().count(), 63);
    }

    #[test]
    fn round_of_32_slot_fills_once_both_feeders_are_picked() {
        let b = bracket();
        let picks = picks_of(&[("South_64_g1", "1|Auburn"), ("South_64_g2", "8|Louisville")]);
        let p = b.progress(&picks);
        let g = &p.regions[0].round32[0];
        assert_eq!(g.team_a, Some(Team::new(1, "Auburn")));
        assert_eq!(g.team_b, Some(Team::new(8, "Louisville")));

        // The next pair (g3/g4) feeds South_32_1, which stays open.
        assert!(!p.regions[0].round32[1].is_resolved());
    }

    #[test]
    fn pick_for_a_team_not_in_the_game_is_inert() {
        let b = bracket();
        let picks = picks_of(&[("South_64_g1", "8|Louisville"), ("South_64_g2", "1|Auburn")]);
        let p = b.progress(&picks);
        assert_eq!(p.regions[0].round32[0].team_a, None);
        assert_eq!(p.regions[0].round32[0].team_b, None);
    }

    #[test]
    fn pick_on_an_unresolved_game_has_no_effect() {
        let b = bracket();
        // South_32_0 has only one slot known, so its pick can't resolve.
        let picks = picks_of(&[("South_64_g1", "1|Auburn"), ("South_32_0", "1|Auburn")]);
        let p = b.progress(&picks);
        assert_eq!(p.regions[0].round32[0].team_a, Some(Team::new(1, "Auburn")));
        assert_eq!(p.regions[0].round32[0].team_b, None);
        assert_eq!(p.regions[0].sweet16[0].team_a, None);
    }

    #[test]
    fn chalk_bracket_crowns_a_champion() {
        let b = bracket();
        let mut picks = PickMap::new();
        // Always take the better seed, round by round.
        for _ in 0..6 {
            let p = b.progress(&picks);
            for game in p.pickable_games() {
                let best = game.teams().min_by_key(|t| t.seed).unwrap();
                picks.entry(game.id.to_string()).or_insert_with(|| best.key().to_string());
            }
        }
        let p = b.progress(&picks);
        assert_eq!(picks.len(), 63);
        assert_eq!(p.regions[0].champion, Some(Team::new(1, "Auburn")));

        // West vs South, East vs Midwest; all one seeds on chalk.
        let ff = &p.final_four;
        assert_eq!(ff.semifinals[0].team_a, Some(Team::new(1, "Florida")));
        assert_eq!(ff.semifinals[0].team_b, Some(Team::new(1, "Auburn")));
        assert_eq!(ff.semifinals[1].team_a, Some(Team::new(1, "Duke")));
        assert_eq!(ff.semifinals[1].team_b, Some(Team::new(1, "Houston")));
        assert!(ff.championship.is_resolved());
        assert!(p.champion().is_some_and(|t| t.seed == 1));
    }

    #[test]
    fn final_four_requires_both_champions() {
        let duke = Team::new(1, "Duke");
        let picks = picks_of(&[("FF_SEMI_1", "1|Duke")]);
        let ff = progress_final_four([Some(duke), None, None, None], &picks);
        assert_eq!(ff.championship.team_a, None);
        assert_eq!(ff.champion, None);
    }

    #[test]
    fn set_pick_validates_against_live_slots() {
        let b = bracket();
        let mut picks = PickMap::new();

        assert_eq!(
            set_pick(&mut picks, true, &b, "South_64_g1", &TeamKey::new("1|Auburn")),
            Err(PickError::Locked)
        );
        assert!(matches!(
            set_pick(&mut picks, false, &b, "Nowhere_64_g1", &TeamKey::new("1|Auburn")),
            Err(PickError::UnknownGame(_))
        ));
        assert!(matches!(
            set_pick(&mut picks, false, &b, "South_32_0", &TeamKey::new("1|Auburn")),
            Err(PickError::Unresolved(_))
        ));
        assert!(matches!(
            set_pick(&mut picks, false, &b, "South_64_g1", &TeamKey::new("1|Duke")),
            Err(PickError::NotInGame { .. })
        ));

        set_pick(&mut picks, false, &b, "South_64_g1", &TeamKey::new("16|Alabama State")).unwrap();
        assert_eq!(picks.get("South_64_g1").map(String::as_str), Some("16|Alabama State"));
    }

    #[test]
    fn changing_an_early_pick_keeps_stale_downstream_picks_inert() {
        let b = bracket();
        let mut picks = picks_of(&[
            ("South_64_g1", "1|Auburn"),
            ("South_64_g2", "8|Louisville"),
            ("South_32_0", "1|Auburn"),
        ]);
        assert_eq!(b.progress(&picks).regions[0].sweet16[0].team_a, Some(Team::new(1, "Auburn")));

        set_pick(&mut picks, false, &b, "South_64_g1", &TeamKey::new("16|Alabama State")).unwrap();
        let p = b.progress(&picks);
        assert_eq!(picks.get("South_32_0").map(String::as_str), Some("1|Auburn"));
        assert_eq!(p.regions[0].sweet16[0].team_a, None);
    }

    proptest! {
        #[test]
        fn progression_is_deterministic(
            choices in prop::collection::vec(any::<bool>(), 63),
            junk in prop::collection::hash_map("South_(64_g[1-8]|32_[0-3])", "[0-9]{1,2}\\|[A-Za-z ]{1,8}", 0..6),
        ) {
            let b = bracket();
            let mut picks = PickMap::new();
            let mut choice = choices.into_iter();
            for _ in 0..6 {
                let p = b.progress(&picks);
                for game in p.pickable_games() {
                    if picks.contains_key(&game.id.to_string()) {
                        continue;
                    }
                    let take_a = choice.next().unwrap_or(true);
                    let team = if take_a { &game.team_a } else { &game.team_b };
                    if let Some(team) = team {
                        picks.insert(game.id.to_string(), team.key().to_string());
                    }
                }
            }
            picks.extend(junk);

            let first = b.progress(&picks);
            let second = b.progress(&picks);
            prop_assert_eq!(first, second);
        }
    }
}
