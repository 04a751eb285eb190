//! Structural checks on match records
//!
//! A match is kept only if it was played on the standard map with ten
//! distinct champions. Bots and placeholder entries repeat champion ids.

use crate::{ExtractionConfig, MatchRecord, NUM_PARTICIPANTS};
use std::collections::HashSet;
use thiserror::Error;

/// Reason a match record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMatch {
    #[error("map {found} is not the standard map {expected}")]
    WrongMap { expected: i64, found: i64 },

    #[error("{found} participants, expected {expected}")]
    ParticipantCount { expected: usize, found: usize },

    #[error("duplicate champion {champion_id}")]
    DuplicateChampion { champion_id: i64 },
}

/// Check a match record, returning the first violated constraint
pub fn validate(record: &MatchRecord, config: &ExtractionConfig) -> Result<(), InvalidMatch> {
    if record.map_id != config.map_id {
        return Err(InvalidMatch::WrongMap {
            expected: config.map_id,
            found: record.map_id,
        });
    }

    if record.participants.len() != NUM_PARTICIPANTS {
        return Err(InvalidMatch::ParticipantCount {
            expected: NUM_PARTICIPANTS,
            found: record.participants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(NUM_PARTICIPANTS);
    for champion_id in record.champion_ids() {
        if !seen.insert(champion_id) {
            return Err(InvalidMatch::DuplicateChampion { champion_id });
        }
    }

    Ok(())
}

/// True iff the record passes every structural check
pub fn is_valid_match(record: &MatchRecord, config: &ExtractionConfig) -> bool {
    validate(record, config).is_ok()
}
