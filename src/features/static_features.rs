//! Single-valued match attributes
//!
//! Pulled straight from the match summary without aggregation.

use crate::features::categories::RankTier;
use crate::{ExtractionConfig, FeatureError, MatchRecord, Result, TeamSide, NUM_PARTICIPANTS};

/// Attributes of one match that do not vary over time
#[derive(Debug, Clone, PartialEq)]
pub struct StaticFeatures {
    /// 1 if team 0's outcome is the fail sentinel, else 0
    pub winner: i64,
    /// team 0 flag minus team 1 flag, in `TeamStats::first_flags` order
    pub team_stats: Vec<i64>,
    pub champions: Vec<i64>,
    pub player_tiers: Vec<String>,
    pub duration: i64,
    pub game_id: i64,
    pub version: String,
    pub game_type: String,
}

impl StaticFeatures {
    pub fn from_match(record: &MatchRecord, config: &ExtractionConfig) -> Result<Self> {
        Ok(StaticFeatures {
            winner: winner_flag(record, &config.fail_sentinel)?,
            team_stats: team_stat_deltas(record)?,
            champions: champion_ids(record)?,
            player_tiers: player_tiers(record)?,
            duration: record.game_duration,
            game_id: record.game_id,
            version: record.game_version.clone(),
            game_type: record.game_type.clone(),
        })
    }
}

/// Winners label.
///
/// Compares team 0's outcome against the fail sentinel, so the flag is 1 when
/// team 0 is recorded as losing. Downstream labels depend on this encoding.
pub fn winner_flag(record: &MatchRecord, fail_sentinel: &str) -> Result<i64> {
    let team0 = record.team(TeamSide::Blue)?;
    Ok(i64::from(team0.win == fail_sentinel))
}

/// First-objective deltas, each in {-1, 0, 1}
pub fn team_stat_deltas(record: &MatchRecord) -> Result<Vec<i64>> {
    let blue = record.team(TeamSide::Blue)?.first_flags();
    let red = record.team(TeamSide::Red)?.first_flags();
    Ok(blue
        .iter()
        .zip(red.iter())
        .map(|(&b, &r)| i64::from(b) - i64::from(r))
        .collect())
}

/// Champion ids of the first ten participants
pub fn champion_ids(record: &MatchRecord) -> Result<Vec<i64>> {
    if record.participants.len() < NUM_PARTICIPANTS {
        return Err(FeatureError::missing(format!(
            "participants[{}]",
            record.participants.len()
        )));
    }
    Ok(record.participants[..NUM_PARTICIPANTS]
        .iter()
        .map(|p| p.champion_id)
        .collect())
}

/// Highest achieved season tier of the first ten participants.
///
/// Tier names must be known `RankTier`s so the column always encodes.
pub fn player_tiers(record: &MatchRecord) -> Result<Vec<String>> {
    (0..NUM_PARTICIPANTS)
        .map(|i| {
            let tier = record
                .participants
                .get(i)
                .and_then(|p| p.highest_achieved_season_tier.clone())
                .ok_or_else(|| {
                    FeatureError::missing(format!("participants[{}].highestAchievedSeasonTier", i))
                })?;
            tier.parse::<RankTier>()?;
            Ok(tier)
        })
        .collect()
}
