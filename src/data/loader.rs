//! JSON loading for match and timeline records
//!
//! Files come in pairs sharing a match id: the timeline file name contains
//! `timeline`, and the summary lives next to it with `match` in its place.

use crate::features::assembler::assemble;
use crate::features::FeatureSet;
use crate::{ExtractionConfig, FeatureError, MatchRecord, Result, TimelineRecord};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const TIMELINE_TAG: &str = "timeline";
const MATCH_TAG: &str = "match";

/// Path of the match summary paired with a timeline file
pub fn match_path_for(timeline_path: &Path) -> Result<PathBuf> {
    let file_name = timeline_path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| n.contains(TIMELINE_TAG))
        .ok_or_else(|| {
            FeatureError::InvalidPath(format!(
                "{} is not a timeline file",
                timeline_path.display()
            ))
        })?;
    Ok(timeline_path.with_file_name(file_name.replace(TIMELINE_TAG, MATCH_TAG)))
}

/// Deserialize a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a timeline and its match summary
pub fn load_match_pair(timeline_path: &Path) -> Result<(MatchRecord, TimelineRecord)> {
    let match_path = match_path_for(timeline_path)?;
    let record = load_json(&match_path)?;
    let timeline = load_json(timeline_path)?;
    Ok((record, timeline))
}

/// Load a timeline pair and extract its features
pub fn load_features(timeline_path: &Path, config: &ExtractionConfig) -> Result<FeatureSet> {
    let (record, timeline) = load_match_pair(timeline_path)?;
    assemble(&record, &timeline, config)
}

/// Timeline JSON files in `dir`, sorted by name
pub fn find_timelines(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_timeline = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(TIMELINE_TAG) && n.ends_with(".json"));
        if path.is_file() && is_timeline {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
