//! Burn Dataset over extracted match features
//!
//! Loads every timeline in a directory, extracts its features and keeps the
//! matches that pass. A bad match is counted and skipped, never fatal.

use crate::data::loader::{find_timelines, load_features};
use crate::features::batch::{FeatureBatch, FeatureBatcher};
use crate::features::tensorize::{tensorize, TensorCorpus};
use crate::features::transpose::{transpose, FeatureColumns};
use crate::features::FeatureSet;
use crate::{Config, ExtractionConfig, FeatureError, Result};
use burn::data::dataloader::{DataLoader, DataLoaderBuilder};
use burn::data::dataset::Dataset;
use burn::tensor::backend::Backend;
use serde_json::error::Category;
use std::path::Path;
use std::sync::Arc;

/// Why matches were left out of a corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Failed the structural checks
    pub invalid: usize,
    /// Missing fields, wrongly typed fields or unknown categories
    pub malformed: usize,
    /// Missing files, I/O failures or JSON that is not well formed
    pub unreadable: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.invalid + self.malformed + self.unreadable
    }

    fn record(&mut self, err: &FeatureError) {
        match err {
            FeatureError::InvalidMatch(_) => self.invalid += 1,
            FeatureError::MissingField { .. } | FeatureError::UnknownCategory { .. } => {
                self.malformed += 1
            }
            // Well-formed JSON that does not fit the record layout
            FeatureError::Json(e) if e.classify() == Category::Data => self.malformed += 1,
            _ => self.unreadable += 1,
        }
    }
}

/// Feature sets of every usable match in a directory
#[derive(Debug, Clone, Default)]
pub struct MatchCorpus {
    matches: Vec<FeatureSet>,
    pub skipped: SkipCounts,
}

impl MatchCorpus {
    pub fn from_features(matches: Vec<FeatureSet>) -> Self {
        MatchCorpus {
            matches,
            skipped: SkipCounts::default(),
        }
    }

    /// Extract features for every timeline/match pair in `dir`
    pub fn load_dir(dir: &Path, config: &ExtractionConfig) -> Result<Self> {
        let timelines = find_timelines(dir)?;
        log::info!("Found {} timelines in {}", timelines.len(), dir.display());

        let mut corpus = MatchCorpus::default();
        for path in &timelines {
            match load_features(path, config) {
                Ok(features) => corpus.matches.push(features),
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    corpus.skipped.record(&e);
                }
            }
        }

        log::info!(
            "Kept {} matches, skipped {} ({} invalid, {} malformed, {} unreadable)",
            corpus.matches.len(),
            corpus.skipped.total(),
            corpus.skipped.invalid,
            corpus.skipped.malformed,
            corpus.skipped.unreadable
        );
        Ok(corpus)
    }

    pub fn matches(&self) -> &[FeatureSet] {
        &self.matches
    }

    pub fn columns(&self) -> Result<FeatureColumns> {
        transpose(&self.matches)
    }

    /// Padded tensors, to `config.tensor.max_frames` if set, else the longest match
    pub fn tensorize(&self, config: &Config) -> Result<TensorCorpus> {
        let columns = self.columns()?;
        let max_frames = match config.tensor.max_frames {
            Some(max) => max,
            None => columns.max_frames()?,
        };
        tensorize(&columns, max_frames)
    }

    /// Loader yielding `FeatureBatch`es of `batch_size` matches in corpus order
    pub fn dataloader<B: Backend>(
        self,
        batch_size: usize,
        device: B::Device,
    ) -> Arc<dyn DataLoader<B, FeatureBatch<B>>> {
        DataLoaderBuilder::new(FeatureBatcher::<B>::new(device))
            .batch_size(batch_size)
            .build(self)
    }
}

impl Dataset<FeatureSet> for MatchCorpus {
    fn get(&self, index: usize) -> Option<FeatureSet> {
        self.matches.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.matches.len()
    }
}
