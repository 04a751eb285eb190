//! MOBA match feature extraction
//!
//! Turns five-versus-five match summaries and their per-frame timelines into
//! numeric features for win prediction.

pub mod data;
pub mod features;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub use features::validator::InvalidMatch;

/// Participants in a standard match
pub const NUM_PARTICIPANTS: usize = 10;

/// Players per team.
///
/// Upstream records are laid out positionally: participants (and actor ids)
/// 1..=5 play for team 0, 6..=10 for team 1. No explicit team id is consulted.
pub const TEAM_SIZE: usize = NUM_PARTICIPANTS / 2;

/// Map id of the standard five-versus-five map
pub const MAP_ID_STANDARD: i64 = 11;

/// Outcome string recorded for a team that lost
pub const FAIL_SENTINEL: &str = "Fail";

/// Side of the map, derived from participant position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSide {
    /// Team 0, participants 1-5
    Blue,
    /// Team 1, participants 6-10
    Red,
}

impl TeamSide {
    /// Team of the acting participant of an event
    pub fn from_actor(actor_id: i64) -> Self {
        if actor_id <= TEAM_SIZE as i64 {
            TeamSide::Blue
        } else {
            TeamSide::Red
        }
    }

    /// Row index in team-level arrays
    pub fn index(self) -> usize {
        match self {
            TeamSide::Blue => 0,
            TeamSide::Red => 1,
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::Blue => write!(f, "Blue"),
            TeamSide::Red => write!(f, "Red"),
        }
    }
}

/// One player's entry in a match summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub champion_id: i64,
    #[serde(default)]
    pub highest_achieved_season_tier: Option<String>,
}

/// Per-team outcome and "first objective" flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub win: String,
    pub first_blood: bool,
    pub first_tower: bool,
    pub first_dragon: bool,
    pub first_rift_herald: bool,
    pub first_inhibitor: bool,
    pub first_baron: bool,
}

impl TeamStats {
    /// First blood, tower, dragon, rift herald, inhibitor, baron
    pub fn first_flags(&self) -> [bool; 6] {
        [
            self.first_blood,
            self.first_tower,
            self.first_dragon,
            self.first_rift_herald,
            self.first_inhibitor,
            self.first_baron,
        ]
    }
}

/// Summary record of a single game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub game_id: i64,
    pub map_id: i64,
    pub game_duration: i64,
    pub game_version: String,
    pub game_type: String,
    pub participants: Vec<Participant>,
    pub teams: Vec<TeamStats>,
}

impl MatchRecord {
    /// Champion ids in participant order
    pub fn champion_ids(&self) -> Vec<i64> {
        self.participants.iter().map(|p| p.champion_id).collect()
    }

    /// Team entry for a side
    pub fn team(&self, side: TeamSide) -> Result<&TeamStats> {
        self.teams
            .get(side.index())
            .ok_or_else(|| FeatureError::missing(format!("teams[{}]", side.index())))
    }
}

/// Per-frame state of one participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFrame {
    pub current_gold: i64,
    pub total_gold: i64,
    pub xp: i64,
}

/// Timeline event. Only the three kinds the counters use are modelled;
/// everything else the feed emits lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Event {
    ChampionKill {
        killer_id: i64,
    },
    BuildingKill {
        killer_id: i64,
        #[serde(default)]
        building_type: Option<String>,
        #[serde(default)]
        tower_type: Option<String>,
    },
    EliteMonsterKill {
        killer_id: i64,
        monster_type: String,
        #[serde(default)]
        monster_sub_type: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// Snapshot of match state at a fixed interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(default)]
    pub timestamp: i64,
    /// Keyed by participant id as a string ("1" to "10")
    pub participant_frames: BTreeMap<String, ParticipantFrame>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Frame {
    /// State of participant `participant_id` (1-based)
    pub fn participant(&self, participant_id: usize) -> Result<&ParticipantFrame> {
        self.participant_frames
            .get(&participant_id.to_string())
            .ok_or_else(|| FeatureError::missing(format!("participantFrames.{}", participant_id)))
    }
}

/// Ordered frames of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRecord {
    pub frames: Vec<Frame>,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Invalid match: {0}")]
    InvalidMatch(#[from] InvalidMatch),

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Unknown {kind}: {value}")]
    UnknownCategory { kind: &'static str, value: String },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Empty corpus - no feature sets to combine")]
    EmptyCorpus,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeatureError {
    pub fn missing(field: impl Into<String>) -> Self {
        FeatureError::MissingField {
            field: field.into(),
        }
    }

    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        FeatureError::UnknownCategory {
            kind,
            value: value.into(),
        }
    }

    /// Errors caused by the data of a single match. The match is skipped;
    /// everything else is a pipeline fault.
    pub fn is_match_skip(&self) -> bool {
        matches!(
            self,
            FeatureError::InvalidMatch(_)
                | FeatureError::MissingField { .. }
                | FeatureError::UnknownCategory { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub tensor: TensorConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Only matches on this map are kept
    pub map_id: i64,
    /// Team 0 outcome string that sets the winners flag
    pub fail_sentinel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorConfig {
    pub rescale_min: f64,
    pub rescale_max: f64,
    /// Pad to this many frames instead of the corpus maximum
    #[serde(default)]
    pub max_frames: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub match_dir: String,
    pub output_path: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            map_id: MAP_ID_STANDARD,
            fail_sentinel: FAIL_SENTINEL.to_string(),
        }
    }
}

impl Default for TensorConfig {
    fn default() -> Self {
        TensorConfig {
            rescale_min: -1.0,
            rescale_max: 1.0,
            max_frames: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            extraction: ExtractionConfig::default(),
            tensor: TensorConfig::default(),
            data: DataConfig {
                match_dir: "data/matches".to_string(),
                output_path: "data/features.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeatureError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FeatureError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FeatureError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
