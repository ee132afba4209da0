use crate::deadline::Deadline;
use crate::scoring::{AnswerKey, PointTable};
use crate::structure::{Bracket, REGION_COUNT, TEAMS_PER_REGION, build_region};
use chrono::{DateTime, FixedOffset};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

const EMBEDDED_TOURNAMENT_JSON: &str = include_str!("../data/2026_tournament.json");

/// Env var pointing at a tournament JSON file that replaces the embedded one.
pub const TOURNAMENT_JSON_ENV: &str = "MADPOOL_TOURNAMENT_JSON";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error, String),
    Parsing(serde_json::Error, String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e, path) => write!(f, "could not read {path}: {e}"),
            ConfigError::Parsing(e, source) => write!(f, "invalid tournament json in {source}: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid tournament config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e, _) => Some(e),
            ConfigError::Parsing(e, _) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    /// Team names in seed order, 1 seed first.
    pub teams: Vec<String>,
}

/// Static tournament tables: field, Final Four pairing, point values and the
/// results entered so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub year: u16,
    pub deadline: Option<DateTime<FixedOffset>>,
    pub regions: Vec<RegionConfig>,
    /// Region names meeting in each national semifinal.
    pub semifinals: [[String; 2]; 2],
    #[serde(default)]
    pub points: PointTable,
    #[serde(default)]
    pub results: HashMap<String, String>,
}

impl TournamentConfig {
    /// The bundled 2026 field and results.
    pub fn embedded() -> ConfigResult<Self> {
        serde_json::from_str(EMBEDDED_TOURNAMENT_JSON)
            .map_err(|e| ConfigError::Parsing(e, "embedded snapshot".into()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e, shown.clone()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parsing(e, shown))
    }

    /// Load the tournament tables.
    ///
    /// Fallback chain:
    /// 1) `MADPOOL_TOURNAMENT_JSON` env var — load from a local JSON file.
    /// 2) Embedded 2026 snapshot.
    pub fn load() -> ConfigResult<Self> {
        if let Ok(path) = std::env::var(TOURNAMENT_JSON_ENV)
            && !path.trim().is_empty()
        {
            debug!("loading tournament config from {path}");
            return Self::from_path(path.trim());
        }
        debug!("using embedded tournament config");
        Self::embedded()
    }

    /// Validate and build the immutable runtime tables.
    pub fn into_tournament(self) -> ConfigResult<Tournament> {
        if self.regions.len() != REGION_COUNT {
            return Err(ConfigError::Invalid(format!(
                "expected {REGION_COUNT} regions, found {}",
                self.regions.len()
            )));
        }
        for region in &self.regions {
            if region.teams.len() != TEAMS_PER_REGION {
                return Err(ConfigError::Invalid(format!(
                    "region {} has {} teams, expected {TEAMS_PER_REGION}",
                    region.name,
                    region.teams.len()
                )));
            }
        }

        let index_of = |name: &str| {
            self.regions
                .iter()
                .position(|r| r.name == name)
                .ok_or_else(|| ConfigError::Invalid(format!("semifinal names unknown region {name}")))
        };
        let semifinals = [
            [index_of(&self.semifinals[0][0])?, index_of(&self.semifinals[0][1])?],
            [index_of(&self.semifinals[1][0])?, index_of(&self.semifinals[1][1])?],
        ];
        let mut used: Vec<usize> = semifinals.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        if used.len() != REGION_COUNT {
            return Err(ConfigError::Invalid("semifinals must pair every region once".into()));
        }

        let regions = self
            .regions
            .iter()
            .map(|r| build_region(&r.name, &r.teams))
            .collect();

        Ok(Tournament {
            year: self.year,
            bracket: Bracket::new(regions, semifinals),
            answer_key: AnswerKey::from_results(&self.results),
            points: self.points,
            deadline: self.deadline.map(Deadline::new).unwrap_or_default(),
        })
    }
}

/// Read-only tables shared by every computation. Loaded once at startup;
/// a results update replaces the whole value.
#[derive(Debug, Clone)]
pub struct Tournament {
    pub year: u16,
    pub bracket: Bracket,
    pub answer_key: AnswerKey,
    pub points: PointTable,
    pub deadline: Deadline,
}

impl Tournament {
    pub fn load() -> ConfigResult<Self> {
        TournamentConfig::load()?.into_tournament()
    }
}
