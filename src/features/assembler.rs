//! Feature assembly for one match
//!
//! Combines the static attributes and per-frame aggregates of a match and its
//! timeline into a single `FeatureSet`.

use crate::features::aggregator::FrameAggregates;
use crate::features::feature_set::{FeatureKey, FeatureSet, FeatureValue};
use crate::features::static_features::StaticFeatures;
use crate::features::validator::validate;
use crate::{ExtractionConfig, MatchRecord, Result, TimelineRecord};

/// Build the feature set of one match.
///
/// Fails on structural invalidity, missing fields or unknown categories; see
/// [`extract`] for the per-match skip boundary.
pub fn assemble(
    record: &MatchRecord,
    timeline: &TimelineRecord,
    config: &ExtractionConfig,
) -> Result<FeatureSet> {
    validate(record, config)?;

    let aggregates = FrameAggregates::from_timeline(timeline)?;
    let statics = StaticFeatures::from_match(record, config)?;

    let mut features = FeatureSet::new();
    features.insert(FeatureKey::Winners, FeatureValue::Int(statics.winner));
    features.insert(
        FeatureKey::CurrentGold,
        FeatureValue::Series(aggregates.current_gold),
    );
    features.insert(
        FeatureKey::TotalGold,
        FeatureValue::Series(aggregates.total_gold),
    );
    features.insert(FeatureKey::Xp, FeatureValue::Series(aggregates.xp));
    features.insert(
        FeatureKey::MaxCurrentGold,
        FeatureValue::Series(aggregates.max_current_gold),
    );
    features.insert(
        FeatureKey::MaxTotalGold,
        FeatureValue::Series(aggregates.max_total_gold),
    );
    features.insert(FeatureKey::MaxXp, FeatureValue::Series(aggregates.max_xp));
    features.insert(
        FeatureKey::NumFrames,
        FeatureValue::Int(aggregates.num_frames as i64),
    );
    features.insert(
        FeatureKey::PlayerTiers,
        FeatureValue::TextVector(statics.player_tiers),
    );
    features.insert(FeatureKey::Duration, FeatureValue::Int(statics.duration));
    features.insert(FeatureKey::MatchIds, FeatureValue::Int(statics.game_id));
    features.insert(FeatureKey::Versions, FeatureValue::Text(statics.version));
    features.insert(FeatureKey::GameTypes, FeatureValue::Text(statics.game_type));
    features.insert(
        FeatureKey::TeamStats,
        FeatureValue::IntVector(statics.team_stats),
    );
    features.insert(
        FeatureKey::Champions,
        FeatureValue::IntVector(statics.champions),
    );
    features.insert(FeatureKey::Kills, FeatureValue::Series(aggregates.kills));
    features.insert(FeatureKey::Buildings, FeatureValue::Grid(aggregates.buildings));
    features.insert(FeatureKey::Monsters, FeatureValue::Grid(aggregates.monsters));

    Ok(features)
}

/// Feature set of one match, or `None` when the match must be skipped.
///
/// Data problems confined to this match (invalid structure, missing fields,
/// unknown categories) yield `None`. Any other failure is a bug and trips a
/// debug assertion.
pub fn extract(
    record: &MatchRecord,
    timeline: &TimelineRecord,
    config: &ExtractionConfig,
) -> Option<FeatureSet> {
    match assemble(record, timeline, config) {
        Ok(features) => Some(features),
        Err(e) => {
            debug_assert!(e.is_match_skip(), "unexpected extraction failure: {}", e);
            log::debug!("Skipping match {}: {}", record.game_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::aggregator::tests::{make_frame, make_timeline};
    use crate::features::static_features::tests::make_record;
    use crate::Event;

    #[test]
    fn test_assemble_all_keys() {
        let record = make_record("Win");
        let timeline = make_timeline(vec![make_frame(1, vec![]), make_frame(2, vec![])]);

        let features = assemble(&record, &timeline, &ExtractionConfig::default()).unwrap();
        assert_eq!(features.len(), FeatureKey::ALL.len());
        for key in FeatureKey::ALL {
            assert!(features.contains(key), "missing {}", key);
        }
        assert_eq!(features.num_frames(), Some(2));
        assert_eq!(features.winner(), Some(0));
    }

    #[test]
    fn test_two_frame_kill_scenario() {
        let record = make_record("Fail");
        let kills: Vec<Event> = (1..=5)
            .map(|killer_id| Event::ChampionKill { killer_id })
            .collect();
        let timeline = make_timeline(vec![make_frame(1, kills), make_frame(1, vec![])]);

        let features = extract(&record, &timeline, &ExtractionConfig::default()).unwrap();
        let kills = features
            .get(FeatureKey::Kills)
            .and_then(FeatureValue::as_series)
            .unwrap();
        assert_eq!(kills.row(0).to_vec(), vec![5.0, 0.0, 5.0]);
        assert_eq!(kills.row(1).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(features.winner(), Some(1));
    }

    #[test]
    fn test_invalid_match_is_skipped() {
        let mut record = make_record("Win");
        record.participants[9].champion_id = record.participants[0].champion_id;
        let timeline = make_timeline(vec![make_frame(1, vec![])]);

        assert!(extract(&record, &timeline, &ExtractionConfig::default()).is_none());
        assert!(matches!(
            assemble(&record, &timeline, &ExtractionConfig::default()),
            Err(crate::FeatureError::InvalidMatch(_))
        ));
    }

    #[test]
    fn test_missing_field_is_skipped() {
        let record = make_record("Win");
        let mut frame = make_frame(1, vec![]);
        frame.participant_frames.remove("4");
        let timeline = make_timeline(vec![make_frame(1, vec![]), frame]);

        assert!(extract(&record, &timeline, &ExtractionConfig::default()).is_none());
    }

    #[test]
    fn test_unknown_monster_is_skipped() {
        let record = make_record("Win");
        let timeline = make_timeline(vec![make_frame(
            1,
            vec![Event::EliteMonsterKill {
                killer_id: 2,
                monster_type: "DRAGON".to_string(),
                monster_sub_type: Some("HEXTECH_DRAGON".to_string()),
            }],
        )]);

        assert!(extract(&record, &timeline, &ExtractionConfig::default()).is_none());
    }
}
