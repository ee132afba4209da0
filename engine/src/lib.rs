pub mod analytics;
pub mod config;
pub mod deadline;
pub mod progression;
pub mod scoring;
pub mod standings;
pub mod structure;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub use analytics::{ChampionShare, ContrarianRow, GameDistribution, PickShare, PoolAnalytics};
pub use config::{ConfigError, Tournament, TournamentConfig};
pub use deadline::Deadline;
pub use progression::{
    BracketProgression, FinalFour, PickError, RegionProgression, progress_bracket,
    progress_final_four, progress_region, set_pick,
};
pub use scoring::{AnswerKey, BracketScore, PointTable, score_bracket};
pub use standings::{StandingRow, Standings};
pub use structure::{Bracket, Game, Region, build_region};

/// Raw pick data as submitted by a client: game id → team key.
/// Untrusted; values that don't match a live team are simply inert.
pub type PickMap = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Tournament stage. Ordered from earliest to latest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum RoundKind {
    #[default]
    #[serde(rename = "64")]
    First, // Round of 64
    #[serde(rename = "32")]
    Second, // Round of 32
    #[serde(rename = "S16")]
    Sweet16,
    #[serde(rename = "E8")]
    Elite8,
    #[serde(rename = "FF")]
    FinalFour, // National semifinals
    #[serde(rename = "CHAMP")]
    Championship,
}

impl RoundKind {
    pub const ALL: [RoundKind; 6] = [
        RoundKind::First,
        RoundKind::Second,
        RoundKind::Sweet16,
        RoundKind::Elite8,
        RoundKind::FinalFour,
        RoundKind::Championship,
    ];

    /// Token used inside game ids and the point table.
    pub fn token(&self) -> &'static str {
        match self {
            RoundKind::First => "64",
            RoundKind::Second => "32",
            RoundKind::Sweet16 => "S16",
            RoundKind::Elite8 => "E8",
            RoundKind::FinalFour => "FF",
            RoundKind::Championship => "CHAMP",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.token() == token)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::First => "Round of 64",
            RoundKind::Second => "Round of 32",
            RoundKind::Sweet16 => "Sweet 16",
            RoundKind::Elite8 => "Elite Eight",
            RoundKind::FinalFour => "Final Four",
            RoundKind::Championship => "Championship",
        }
    }

    pub fn is_final_four(&self) -> bool {
        matches!(self, RoundKind::FinalFour | RoundKind::Championship)
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            RoundKind::First => None,
            RoundKind::Second => Some(RoundKind::First),
            RoundKind::Sweet16 => Some(RoundKind::Second),
            RoundKind::Elite8 => Some(RoundKind::Sweet16),
            RoundKind::FinalFour => Some(RoundKind::Elite8),
            RoundKind::Championship => Some(RoundKind::FinalFour),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            RoundKind::First => Some(RoundKind::Second),
            RoundKind::Second => Some(RoundKind::Sweet16),
            RoundKind::Sweet16 => Some(RoundKind::Elite8),
            RoundKind::Elite8 => Some(RoundKind::FinalFour),
            RoundKind::FinalFour => Some(RoundKind::Championship),
            RoundKind::Championship => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Game identifiers
// ---------------------------------------------------------------------------

/// Structured game identifier. `Display` is the one canonical string encoding
/// shared by structure, progression, scoring and the pick map:
///
///   - round of 64: `South_64_g1` .. `South_64_g8` (1-based, `g` prefix)
///   - later regional rounds: `South_32_0`, `South_S16_1`, `South_E8_0`
///   - national rounds: `FF_SEMI_1`, `FF_SEMI_2`, `FF_CHAMP`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameId {
    Regional {
        region: String,
        round: RoundKind,
        index: usize, // 0-based position within the region's round
    },
    Semifinal(u8), // 1 or 2
    Championship,
}

impl GameId {
    pub fn regional(region: impl Into<String>, round: RoundKind, index: usize) -> Self {
        GameId::Regional { region: region.into(), round, index }
    }

    pub fn round(&self) -> RoundKind {
        match self {
            GameId::Regional { round, .. } => *round,
            GameId::Semifinal(_) => RoundKind::FinalFour,
            GameId::Championship => RoundKind::Championship,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            GameId::Regional { region, .. } => Some(region),
            _ => None,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::Regional { region, round: RoundKind::First, index } => {
                write!(f, "{region}_64_g{}", index + 1)
            }
            GameId::Regional { region, round, index } => {
                write!(f, "{region}_{}_{index}", round.token())
            }
            GameId::Semifinal(n) => write!(f, "FF_SEMI_{n}"),
            GameId::Championship => write!(f, "FF_CHAMP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGameIdError(pub String);

impl fmt::Display for ParseGameIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized game id: {}", self.0)
    }
}

impl std::error::Error for ParseGameIdError {}

impl FromStr for GameId {
    type Err = ParseGameIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FF_SEMI_1" => return Ok(GameId::Semifinal(1)),
            "FF_SEMI_2" => return Ok(GameId::Semifinal(2)),
            "FF_CHAMP" => return Ok(GameId::Championship),
            _ => {}
        }

        let err = || ParseGameIdError(s.to_string());

        // Region names may contain underscores, so split from the right.
        let mut parts = s.rsplitn(3, '_');
        let index_token = parts.next().ok_or_else(err)?;
        let round_token = parts.next().ok_or_else(err)?;
        let region = parts.next().filter(|r| !r.is_empty()).ok_or_else(err)?;

        let round = RoundKind::from_token(round_token)
            .filter(|r| !r.is_final_four())
            .ok_or_else(err)?;

        let index = if round == RoundKind::First {
            index_token
                .strip_prefix('g')
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(err)?
        } else {
            index_token.parse::<usize>().map_err(|_| err())?
        };

        // Ids join picks to results byte for byte, so `g01` or `+1` must not
        // quietly alias the canonical form.
        let id = GameId::regional(region, round, index);
        if id.to_string() != s {
            return Err(err());
        }
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Teams and entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub seed: u8,
    pub name: String, // "Michigan State"
}

impl Team {
    pub fn new(seed: u8, name: impl Into<String>) -> Self {
        Self { seed, name: name.into() }
    }

    /// The pick value that selects this team, e.g. `"1|Duke"`.
    pub fn key(&self) -> TeamKey {
        TeamKey(format!("{}|{}", self.seed, self.name))
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.seed, self.name)
    }
}

/// Opaque pick value identifying one team, `"{seed}|{name}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamKey(String);

impl TeamKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TeamKey> for String {
    fn from(key: TeamKey) -> Self {
        key.0
    }
}

impl PartialEq<str> for TeamKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<String> for TeamKey {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

/// One user's submitted bracket, as a read-only snapshot.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub locked: bool,
    pub picks: PickMap,
}

impl Entry {
    pub fn has_picks(&self) -> bool {
        !self.picks.is_empty()
    }

    /// The picked national champion, if any.
    pub fn champion_pick(&self) -> Option<&str> {
        self.picks
            .get(&GameId::Championship.to_string())
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}
