//! Column view of a corpus
//!
//! Turns `[{feature => value}]` into `{feature => [value]}`, index-aligned
//! with the input order.

use crate::features::feature_set::{FeatureKey, FeatureSet, FeatureValue};
use crate::{FeatureError, Result};
use std::collections::BTreeMap;

/// Per-feature values of every match in a corpus
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    columns: BTreeMap<FeatureKey, Vec<FeatureValue>>,
    num_matches: usize,
}

impl FeatureColumns {
    pub fn get(&self, key: FeatureKey) -> Option<&[FeatureValue]> {
        self.columns.get(&key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.columns.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &[FeatureValue])> + '_ {
        self.columns.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn num_matches(&self) -> usize {
        self.num_matches
    }

    /// Reassemble the feature set of match `index`
    pub fn row(&self, index: usize) -> Option<FeatureSet> {
        if index >= self.num_matches {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(key, values)| (*key, values[index].clone()))
                .collect(),
        )
    }

    /// Longest match in the corpus, from the `num_frames` feature
    pub fn max_frames(&self) -> Result<usize> {
        let values = self
            .get(FeatureKey::NumFrames)
            .ok_or_else(|| FeatureError::missing(FeatureKey::NumFrames.as_str()))?;
        values.iter().try_fold(0usize, |max, value| {
            let frames = value
                .as_int()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    FeatureError::ShapeMismatch(format!(
                        "num_frames must be a non-negative int, got {}",
                        value.kind()
                    ))
                })?;
            Ok(max.max(frames))
        })
    }
}

/// Transpose feature sets into columns.
///
/// Every set must have the first set's keys; an empty input is an error.
pub fn transpose(matches: &[FeatureSet]) -> Result<FeatureColumns> {
    let first = matches.first().ok_or(FeatureError::EmptyCorpus)?;

    let mut columns: BTreeMap<FeatureKey, Vec<FeatureValue>> = first
        .keys()
        .map(|key| (key, Vec::with_capacity(matches.len())))
        .collect();

    for (index, features) in matches.iter().enumerate() {
        if features.len() != columns.len() || features.keys().any(|k| !columns.contains_key(&k)) {
            let expected: Vec<_> = first.keys().map(FeatureKey::as_str).collect();
            let found: Vec<_> = features.keys().map(FeatureKey::as_str).collect();
            return Err(FeatureError::ShapeMismatch(format!(
                "match {} has keys {:?}, expected {:?}",
                index, found, expected
            )));
        }
        for (key, value) in features.iter() {
            if let Some(column) = columns.get_mut(key) {
                column.push(value.clone());
            }
        }
    }

    Ok(FeatureColumns {
        columns,
        num_matches: matches.len(),
    })
}
