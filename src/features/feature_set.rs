//! Per-match feature dictionary

use ndarray::{Array2, Array3};
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Name of a feature. Serialized in snake case (`current_gold`, `max_xp`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Winners,
    CurrentGold,
    TotalGold,
    Xp,
    MaxCurrentGold,
    MaxTotalGold,
    MaxXp,
    NumFrames,
    PlayerTiers,
    Duration,
    MatchIds,
    Versions,
    GameTypes,
    TeamStats,
    Champions,
    Kills,
    Buildings,
    Monsters,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 18] = [
        FeatureKey::Winners,
        FeatureKey::CurrentGold,
        FeatureKey::TotalGold,
        FeatureKey::Xp,
        FeatureKey::MaxCurrentGold,
        FeatureKey::MaxTotalGold,
        FeatureKey::MaxXp,
        FeatureKey::NumFrames,
        FeatureKey::PlayerTiers,
        FeatureKey::Duration,
        FeatureKey::MatchIds,
        FeatureKey::Versions,
        FeatureKey::GameTypes,
        FeatureKey::TeamStats,
        FeatureKey::Champions,
        FeatureKey::Kills,
        FeatureKey::Buildings,
        FeatureKey::Monsters,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKey::Winners => "winners",
            FeatureKey::CurrentGold => "current_gold",
            FeatureKey::TotalGold => "total_gold",
            FeatureKey::Xp => "xp",
            FeatureKey::MaxCurrentGold => "max_current_gold",
            FeatureKey::MaxTotalGold => "max_total_gold",
            FeatureKey::MaxXp => "max_xp",
            FeatureKey::NumFrames => "num_frames",
            FeatureKey::PlayerTiers => "player_tiers",
            FeatureKey::Duration => "duration",
            FeatureKey::MatchIds => "match_ids",
            FeatureKey::Versions => "versions",
            FeatureKey::GameTypes => "game_types",
            FeatureKey::TeamStats => "team_stats",
            FeatureKey::Champions => "champions",
            FeatureKey::Kills => "kills",
            FeatureKey::Buildings => "buildings",
            FeatureKey::Monsters => "monsters",
        }
    }

    /// Features with a leading frame axis
    pub fn is_per_frame(self) -> bool {
        matches!(
            self,
            FeatureKey::CurrentGold
                | FeatureKey::TotalGold
                | FeatureKey::Xp
                | FeatureKey::MaxCurrentGold
                | FeatureKey::MaxTotalGold
                | FeatureKey::MaxXp
                | FeatureKey::Kills
                | FeatureKey::Buildings
                | FeatureKey::Monsters
        )
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a single feature for one match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Text(String),
    IntVector(Vec<i64>),
    TextVector(Vec<String>),
    /// [frame, 3]
    Series(Array2<f64>),
    /// [frame, 3, category]
    Grid(Array3<f64>),
}

impl FeatureValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Int(_) => "int",
            FeatureValue::Text(_) => "text",
            FeatureValue::IntVector(_) => "int vector",
            FeatureValue::TextVector(_) => "text vector",
            FeatureValue::Series(_) => "series",
            FeatureValue::Grid(_) => "grid",
        }
    }

    /// Length of the frame axis for per-frame values
    pub fn frame_count(&self) -> Option<usize> {
        match self {
            FeatureValue::Series(a) => Some(a.nrows()),
            FeatureValue::Grid(a) => Some(a.shape()[0]),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&Array2<f64>> {
        match self {
            FeatureValue::Series(a) => Some(a),
            _ => None,
        }
    }
}

/// All features of one match
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureSet {
    values: BTreeMap<FeatureKey, FeatureValue>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FeatureKey, value: FeatureValue) -> Option<FeatureValue> {
        self.values.insert(key, value)
    }

    pub fn get(&self, key: FeatureKey) -> Option<&FeatureValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: FeatureKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FeatureKey, FeatureValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn num_frames(&self) -> Option<usize> {
        self.get(FeatureKey::NumFrames)
            .and_then(FeatureValue::as_int)
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn winner(&self) -> Option<i64> {
        self.get(FeatureKey::Winners).and_then(FeatureValue::as_int)
    }
}

impl FromIterator<(FeatureKey, FeatureValue)> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = (FeatureKey, FeatureValue)>>(iter: T) -> Self {
        FeatureSet {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_match_serde() {
        for key in FeatureKey::ALL {
            let json = serde_json::to_value(key).unwrap();
            assert_eq!(json, serde_json::Value::String(key.as_str().to_string()));
        }
    }

    #[test]
    fn test_per_frame_keys() {
        let per_frame: Vec<_> = FeatureKey::ALL
            .into_iter()
            .filter(|k| k.is_per_frame())
            .collect();
        assert_eq!(per_frame.len(), 9);
        assert!(!FeatureKey::NumFrames.is_per_frame());
    }

    #[test]
    fn test_feature_set_accessors() {
        let set: FeatureSet = [
            (FeatureKey::NumFrames, FeatureValue::Int(3)),
            (FeatureKey::Winners, FeatureValue::Int(1)),
            (FeatureKey::Kills, FeatureValue::Series(Array2::zeros((3, 3)))),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 3);
        assert_eq!(set.num_frames(), Some(3));
        assert_eq!(set.winner(), Some(1));
        assert_eq!(set.get(FeatureKey::Kills).and_then(|v| v.frame_count()), Some(3));
        assert!(!set.contains(FeatureKey::Monsters));
    }
}
