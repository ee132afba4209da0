use crate::{GameId, RoundKind, Team};

pub const TEAMS_PER_REGION: usize = 16;
pub const REGION_COUNT: usize = 4;

/// Standard 1–16 pairing as (seed index A, seed index B), in presentation order.
/// Consecutive pairs feed the same round-of-32 game.
const PAIRINGS: [(usize, usize); 8] = [
    (0, 15), // 1 vs 16
    (7, 8),  // 8 vs 9
    (4, 11), // 5 vs 12
    (3, 12), // 4 vs 13
    (5, 10), // 6 vs 11
    (2, 13), // 3 vs 14
    (6, 9),  // 7 vs 10
    (1, 14), // 2 vs 15
];

/// One matchup. A `None` slot is TBD: the feeding game has no valid pick yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub team_a: Option<Team>,
    pub team_b: Option<Team>,
}

impl Game {
    pub fn is_resolved(&self) -> bool {
        self.team_a.is_some() && self.team_b.is_some()
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.team_a.iter().chain(self.team_b.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String, // "South", "West", "East", "Midwest"
    pub round64: Vec<Game>,
}

/// Build a region's round-of-64 games from 16 team names in seed order.
///
/// # Panics
///
/// Panics if `teams` doesn't hold exactly 16 names. Region lists are static
/// configuration, validated once at load time.
pub fn build_region<S: AsRef<str>>(name: &str, teams: &[S]) -> Region {
    assert_eq!(
        teams.len(),
        TEAMS_PER_REGION,
        "region {name} needs {TEAMS_PER_REGION} teams in seed order"
    );

    let team = |idx: usize| Team::new((idx + 1) as u8, teams[idx].as_ref());

    let round64 = PAIRINGS
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| Game {
            id: GameId::regional(name, RoundKind::First, i),
            team_a: Some(team(a)),
            team_b: Some(team(b)),
        })
        .collect();

    Region { name: name.to_string(), round64 }
}

/// The full 64-team field: four regions plus the fixed Final Four pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    pub regions: Vec<Region>,
    /// Region indices meeting in `FF_SEMI_1` and `FF_SEMI_2`.
    pub semifinals: [[usize; 2]; 2],
}

impl Bracket {
    /// # Panics
    ///
    /// Panics unless there are four regions and the semifinal pairing uses
    /// each region index exactly once.
    pub fn new(regions: Vec<Region>, semifinals: [[usize; 2]; 2]) -> Self {
        assert_eq!(regions.len(), REGION_COUNT, "a bracket has {REGION_COUNT} regions");
        let mut used: Vec<usize> = semifinals.iter().flatten().copied().collect();
        used.sort_unstable();
        assert_eq!(used, [0, 1, 2, 3], "semifinal pairing must use every region once");
        Self { regions, semifinals }
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn region_index(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOUTH: [&str; 16] = [
        "Auburn",
        "Michigan State",
        "Iowa State",
        "Texas A&M",
        "Michigan",
        "Ole Miss",
        "Marquette",
        "Louisville",
        "Creighton",
        "New Mexico",
        "North Carolina",
        "UC San Diego",
        "Yale",
        "Lipscomb",
        "Bryant",
        "Alabama State",
    ];

    #[test]
    fn first_games_follow_pairing_table() {
        let region = build_region("South", &SOUTH);
        assert_eq!(region.round64.len(), 8);

        let g1 = &region.round64[0];
        assert_eq!(g1.id.to_string(), "South_64_g1");
        assert_eq!(g1.team_a, Some(Team::new(1, "Auburn")));
        assert_eq!(g1.team_b, Some(Team::new(16, "Alabama State")));

        let g2 = &region.round64[1];
        assert_eq!(g2.id.to_string(), "South_64_g2");
        assert_eq!(g2.team_a, Some(Team::new(8, "Louisville")));
        assert_eq!(g2.team_b, Some(Team::new(9, "Creighton")));

        let g8 = &region.round64[7];
        assert_eq!(g8.id.to_string(), "South_64_g8");
        assert_eq!(g8.team_a, Some(Team::new(2, "Michigan State")));
        assert_eq!(g8.team_b, Some(Team::new(15, "Bryant")));
    }

    #[test]
    fn every_seed_appears_once() {
        let region = build_region("South", &SOUTH);
        let mut seeds: Vec<u8> = region.round64.iter().flat_map(|g| g.teams()).map(|t| t.seed).collect();
        seeds.sort_unstable();
        assert_eq!(seeds, (1..=16).collect::<Vec<u8>>());
        assert!(region.round64.iter().all(Game::is_resolved));
    }

    #[test]
    #[should_panic(expected = "needs 16 teams")]
    fn short_team_list_is_a_caller_error() {
        build_region("South", &SOUTH[..15]);
    }

    #[test]
    #[should_panic(expected = "every region once")]
    fn semifinals_must_cover_all_regions() {
        let regions = (0..4).map(|i| build_region(&format!("R{i}"), &SOUTH)).collect();
        Bracket::new(regions, [[0, 1], [1, 2]]);
    }
}
