//! Burn tensors for sequence models
//!
//! Converts a padded `TensorCorpus` into backend tensors, plus a frame mask
//! marking which timesteps hold real data. `FeatureBatcher` also implements
//! burn's `Batcher`, so a `MatchCorpus` can feed a `DataLoader` directly.

use crate::features::feature_set::{FeatureKey, FeatureSet};
use crate::features::tensorize::{tensorize_sets, TensorCorpus};
use crate::{FeatureError, Result};
use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::{Bool, Int, Tensor, TensorData};

/// One corpus as backend tensors
#[derive(Debug, Clone)]
pub struct FeatureBatch<B: Backend> {
    /// Team economy series: [batch, frames, 3]
    pub current_gold: Tensor<B, 3>,
    pub total_gold: Tensor<B, 3>,
    pub xp: Tensor<B, 3>,
    pub max_current_gold: Tensor<B, 3>,
    pub max_total_gold: Tensor<B, 3>,
    pub max_xp: Tensor<B, 3>,
    /// Kills: [batch, frames, 3]
    pub kills: Tensor<B, 3>,
    /// Structures destroyed: [batch, frames, 3, 5]
    pub buildings: Tensor<B, 4>,
    /// Elite monsters killed: [batch, frames, 3, 7]
    pub monsters: Tensor<B, 4>,
    /// First-objective deltas: [batch, 6]
    pub team_stats: Tensor<B, 2>,
    /// Champion ids: [batch, 10]
    pub champions: Tensor<B, 2, Int>,
    /// Rank tier ordinals: [batch, 10]
    pub player_tiers: Tensor<B, 2, Int>,
    /// Real frame count per match: [batch]
    pub num_frames: Tensor<B, 1, Int>,
    /// True for real frames, false for padding: [batch, frames]
    pub frame_mask: Tensor<B, 2, Bool>,
    /// Target labels: [batch]
    pub winners: Tensor<B, 1>,
}

fn fixed_shape<const D: usize>(key: FeatureKey, shape: &[usize]) -> Result<[usize; D]> {
    shape.try_into().map_err(|_| {
        FeatureError::ShapeMismatch(format!("{} has rank {}, expected {}", key, shape.len(), D))
    })
}

/// Builds `FeatureBatch`es on a fixed device
#[derive(Clone)]
pub struct FeatureBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> FeatureBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        FeatureBatcher { device }
    }

    fn float<const D: usize>(&self, corpus: &TensorCorpus, key: FeatureKey) -> Result<Tensor<B, D>> {
        let array = corpus.float(key)?;
        let shape = fixed_shape::<D>(key, array.shape())?;
        let data: Vec<f32> = array.iter().map(|&v| v as f32).collect();
        Ok(Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape(shape))
    }

    /// Integer feature as a float tensor (labels, deltas)
    fn float_from_int<const D: usize>(
        &self,
        corpus: &TensorCorpus,
        key: FeatureKey,
    ) -> Result<Tensor<B, D>> {
        let array = corpus.int(key)?;
        let shape = fixed_shape::<D>(key, array.shape())?;
        let data: Vec<f32> = array.iter().map(|&v| v as f32).collect();
        Ok(Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape(shape))
    }

    fn int<const D: usize>(&self, corpus: &TensorCorpus, key: FeatureKey) -> Result<Tensor<B, D, Int>> {
        let array = corpus.int(key)?;
        let shape = fixed_shape::<D>(key, array.shape())?;
        let data: Vec<i32> = array.iter().map(|&v| v as i32).collect();
        Ok(Tensor::<B, 1, Int>::from_ints(data.as_slice(), &self.device).reshape(shape))
    }

    fn frame_mask(&self, corpus: &TensorCorpus) -> Result<Tensor<B, 2, Bool>> {
        let num_frames = corpus.int(FeatureKey::NumFrames)?;
        let mut mask = Vec::with_capacity(corpus.num_matches * corpus.max_frames);
        for &frames in num_frames.iter() {
            mask.extend((0..corpus.max_frames).map(|f| (f as i64) < frames));
        }
        Ok(
            Tensor::<B, 1, Bool>::from_bool(TensorData::from(mask.as_slice()), &self.device)
                .reshape([corpus.num_matches, corpus.max_frames]),
        )
    }

    /// Tensorize a group of matches, padded to the longest one, and batch it
    pub fn batch_sets(&self, items: &[FeatureSet]) -> Result<FeatureBatch<B>> {
        self.batch_corpus(&tensorize_sets(items)?)
    }

    pub fn batch_corpus(&self, corpus: &TensorCorpus) -> Result<FeatureBatch<B>> {
        Ok(FeatureBatch {
            current_gold: self.float(corpus, FeatureKey::CurrentGold)?,
            total_gold: self.float(corpus, FeatureKey::TotalGold)?,
            xp: self.float(corpus, FeatureKey::Xp)?,
            max_current_gold: self.float(corpus, FeatureKey::MaxCurrentGold)?,
            max_total_gold: self.float(corpus, FeatureKey::MaxTotalGold)?,
            max_xp: self.float(corpus, FeatureKey::MaxXp)?,
            kills: self.float(corpus, FeatureKey::Kills)?,
            buildings: self.float(corpus, FeatureKey::Buildings)?,
            monsters: self.float(corpus, FeatureKey::Monsters)?,
            team_stats: self.float_from_int(corpus, FeatureKey::TeamStats)?,
            champions: self.int(corpus, FeatureKey::Champions)?,
            player_tiers: self.int(corpus, FeatureKey::PlayerTiers)?,
            num_frames: self.int(corpus, FeatureKey::NumFrames)?,
            frame_mask: self.frame_mask(corpus)?,
            winners: self.float_from_int(corpus, FeatureKey::Winners)?,
        })
    }
}

/// Batches of extracted matches, each padded to its own longest match.
///
/// # Panics
///
/// If the items do not share one feature layout, which cannot happen for sets
/// produced by `assemble`.
impl<B: Backend> Batcher<B, FeatureSet, FeatureBatch<B>> for FeatureBatcher<B> {
    fn batch(&self, items: Vec<FeatureSet>, _device: &B::Device) -> FeatureBatch<B> {
        match self.batch_sets(&items) {
            Ok(batch) => batch,
            Err(e) => panic!("cannot batch {} matches: {}", items.len(), e),
        }
    }
}
