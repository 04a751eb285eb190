//! Corpus tensorization
//!
//! Zero-pads every per-frame feature to a common frame count and stacks the
//! matches along a new leading axis. Rank tiers become ordinal codes.

use crate::features::categories::RankTier;
use crate::features::feature_set::{FeatureKey, FeatureSet, FeatureValue};
use crate::features::transpose::{transpose, FeatureColumns};
use crate::{FeatureError, Result, TensorConfig};
use ndarray::{Array, Array1, Array2, ArrayD, ArrayView, Axis, Dimension, RemoveAxis, Slice};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stacked values of one feature across a corpus, leading axis = match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dtype", content = "values", rename_all = "snake_case")]
pub enum TensorValue {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
    Text(Vec<String>),
}

impl TensorValue {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            TensorValue::Float(a) => a.shape().to_vec(),
            TensorValue::Int(a) => a.shape().to_vec(),
            TensorValue::Text(v) => vec![v.len()],
        }
    }

    pub fn as_float(&self) -> Option<&ArrayD<f64>> {
        match self {
            TensorValue::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&ArrayD<i64>> {
        match self {
            TensorValue::Int(a) => Some(a),
            _ => None,
        }
    }
}

/// Uniform-shape arrays for a whole corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TensorCorpus {
    pub num_matches: usize,
    pub max_frames: usize,
    pub tensors: BTreeMap<FeatureKey, TensorValue>,
}

impl TensorCorpus {
    pub fn get(&self, key: FeatureKey) -> Option<&TensorValue> {
        self.tensors.get(&key)
    }

    pub fn float(&self, key: FeatureKey) -> Result<&ArrayD<f64>> {
        self.get(key)
            .and_then(TensorValue::as_float)
            .ok_or_else(|| FeatureError::ShapeMismatch(format!("{} is not a float tensor", key)))
    }

    pub fn int(&self, key: FeatureKey) -> Result<&ArrayD<i64>> {
        self.get(key)
            .and_then(TensorValue::as_int)
            .ok_or_else(|| FeatureError::ShapeMismatch(format!("{} is not an int tensor", key)))
    }

    /// Rescale every per-frame float tensor to the configured range.
    ///
    /// Bounds come from the real frames of each match (its `num_frames`), and
    /// the padded frames stay zero.
    pub fn rescaled(&self, config: &TensorConfig) -> Result<Self> {
        let num_frames: Vec<usize> = self
            .int(FeatureKey::NumFrames)?
            .iter()
            .map(|&n| usize::try_from(n).unwrap_or(0))
            .collect();
        let tensors = self
            .tensors
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    TensorValue::Float(a) if key.is_per_frame() => TensorValue::Float(
                        rescale_frames(a, &num_frames, config.rescale_min, config.rescale_max),
                    ),
                    other => other.clone(),
                };
                (*key, value)
            })
            .collect();
        Ok(TensorCorpus {
            num_matches: self.num_matches,
            max_frames: self.max_frames,
            tensors,
        })
    }
}

/// Right-pad the frame axis (axis 0) with zeros up to `max_frames`
pub fn pad_frames<D: Dimension>(array: &Array<f64, D>, max_frames: usize) -> Result<Array<f64, D>> {
    let frames = array.len_of(Axis(0));
    if frames > max_frames {
        return Err(FeatureError::ShapeMismatch(format!(
            "{} frames exceed padding length {}",
            frames, max_frames
        )));
    }

    let mut dim = array.raw_dim();
    dim[0] = max_frames;
    let mut padded = Array::zeros(dim);
    padded
        .slice_axis_mut(Axis(0), Slice::from(0..frames))
        .assign(array);
    Ok(padded)
}

/// Pad each array to `max_frames` and stack them, shape [match, max_frames, ...]
pub fn stack_padded<D>(arrays: &[&Array<f64, D>], max_frames: usize) -> Result<ArrayD<f64>>
where
    D: Dimension,
    D::Larger: RemoveAxis,
{
    let padded = arrays
        .iter()
        .map(|a| pad_frames(a, max_frames))
        .collect::<Result<Vec<_>>>()?;
    let views: Vec<ArrayView<f64, D>> = padded.iter().map(|a| a.view()).collect();
    let stacked = ndarray::stack(Axis(0), &views)
        .map_err(|e| FeatureError::ShapeMismatch(format!("cannot stack frames: {}", e)))?;
    Ok(stacked.into_dyn())
}

/// Map rank tier names to their ordinal codes
pub fn encode_tiers(tiers: &[String]) -> Result<Vec<i64>> {
    tiers
        .iter()
        .map(|t| t.parse::<RankTier>().map(RankTier::ordinal))
        .collect()
}

/// Linearly map `array` from its own [min, max] onto [new_min, new_max].
///
/// A constant array maps every element to `new_min`. Empty arrays are
/// returned as they are.
pub fn rescale<D: Dimension>(array: &Array<f64, D>, new_min: f64, new_max: f64) -> Array<f64, D> {
    if array.is_empty() {
        return array.clone();
    }
    let min = array.fold(f64::INFINITY, |acc, &v| acc.min(v));
    let max = array.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let scale = linear_map(min, max, new_min, new_max);
    array.mapv(scale)
}

fn linear_map(min: f64, max: f64, new_min: f64, new_max: f64) -> impl Fn(f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        log::debug!("Rescaling constant values ({}), mapping to {}", min, new_min);
    }
    move |v| {
        if range == 0.0 {
            new_min
        } else {
            (v - min) / range * (new_max - new_min) + new_min
        }
    }
}

/// Rescale a stacked [match, frame, ...] array using only the first
/// `num_frames[i]` frames of match `i`; padding is left untouched
fn rescale_frames(array: &ArrayD<f64>, num_frames: &[usize], new_min: f64, new_max: f64) -> ArrayD<f64> {
    let real_frames = |m: usize, frames_in_array: usize| {
        num_frames.get(m).copied().unwrap_or(0).min(frames_in_array)
    };

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (m, frames) in array.outer_iter().enumerate() {
        let real = real_frames(m, frames.len_of(Axis(0)));
        for &v in frames.slice_axis(Axis(0), Slice::from(0..real)).iter() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min > max {
        // No real frames anywhere
        return array.clone();
    }

    let scale = linear_map(min, max, new_min, new_max);
    let mut scaled = array.clone();
    for (m, mut frames) in scaled.outer_iter_mut().enumerate() {
        let real = real_frames(m, frames.len_of(Axis(0)));
        frames
            .slice_axis_mut(Axis(0), Slice::from(0..real))
            .mapv_inplace(&scale);
    }
    scaled
}

fn mismatch(key: FeatureKey, expected: &str, found: &FeatureValue) -> FeatureError {
    FeatureError::ShapeMismatch(format!(
        "{} mixes {} and {} values",
        key,
        expected,
        found.kind()
    ))
}

fn int_matrix(key: FeatureKey, rows: Vec<Vec<i64>>) -> Result<ArrayD<i64>> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(bad) = rows.iter().find(|r| r.len() != width) {
        return Err(FeatureError::ShapeMismatch(format!(
            "{} rows have lengths {} and {}",
            key,
            width,
            bad.len()
        )));
    }
    let n = rows.len();
    let flat: Vec<i64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n, width), flat)
        .map(|a| a.into_dyn())
        .map_err(|e| FeatureError::ShapeMismatch(format!("{}: {}", key, e)))
}

fn tensorize_column(
    key: FeatureKey,
    values: &[FeatureValue],
    max_frames: usize,
) -> Result<TensorValue> {
    let first = values.first().ok_or(FeatureError::EmptyCorpus)?;
    match first {
        FeatureValue::Int(_) => {
            let ints = values
                .iter()
                .map(|v| match v {
                    FeatureValue::Int(i) => Ok(*i),
                    other => Err(mismatch(key, "int", other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TensorValue::Int(Array1::from(ints).into_dyn()))
        }
        FeatureValue::Text(_) => {
            let texts = values
                .iter()
                .map(|v| match v {
                    FeatureValue::Text(s) => Ok(s.clone()),
                    other => Err(mismatch(key, "text", other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TensorValue::Text(texts))
        }
        FeatureValue::IntVector(_) => {
            let rows = values
                .iter()
                .map(|v| match v {
                    FeatureValue::IntVector(r) => Ok(r.clone()),
                    other => Err(mismatch(key, "int vector", other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TensorValue::Int(int_matrix(key, rows)?))
        }
        // Text vectors are rank tiers; encode through the ordinal table
        FeatureValue::TextVector(_) => {
            let rows = values
                .iter()
                .map(|v| match v {
                    FeatureValue::TextVector(r) => encode_tiers(r),
                    other => Err(mismatch(key, "text vector", other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TensorValue::Int(int_matrix(key, rows)?))
        }
        FeatureValue::Series(_) => {
            let arrays = values
                .iter()
                .map(|v| match v {
                    FeatureValue::Series(a) => Ok(a),
                    other => Err(mismatch(key, "series", other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TensorValue::Float(stack_padded(&arrays, max_frames)?))
        }
        FeatureValue::Grid(_) => {
            let arrays = values
                .iter()
                .map(|v| match v {
                    FeatureValue::Grid(a) => Ok(a),
                    other => Err(mismatch(key, "grid", other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TensorValue::Float(stack_padded(&arrays, max_frames)?))
        }
    }
}

/// Tensorize a transposed corpus, padding per-frame features to `max_frames`
pub fn tensorize(columns: &FeatureColumns, max_frames: usize) -> Result<TensorCorpus> {
    let tensors = columns
        .iter()
        .map(|(key, values)| {
            tensorize_column(key, values, max_frames)
                .map(|tensor| (key, tensor))
                .map_err(|e| {
                    log::warn!("Failed to tensorize {}: {}", key, e);
                    e
                })
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(TensorCorpus {
        num_matches: columns.num_matches(),
        max_frames,
        tensors,
    })
}

/// Transpose and tensorize feature sets, padding to the longest match
pub fn tensorize_sets(matches: &[FeatureSet]) -> Result<TensorCorpus> {
    let columns = transpose(matches)?;
    let max_frames = columns.max_frames()?;
    tensorize(&columns, max_frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s, Array3};

    fn make_set(frames: usize, tiers: [&str; 2]) -> FeatureSet {
        let series = Array2::from_shape_fn((frames, 3), |(f, c)| (f * 10 + c + 1) as f64);
        let grid = Array3::from_shape_fn((frames, 3, 5), |(f, r, c)| (f + r + c) as f64);
        [
            (FeatureKey::NumFrames, FeatureValue::Int(frames as i64)),
            (FeatureKey::Winners, FeatureValue::Int(1)),
            (FeatureKey::GameTypes, FeatureValue::Text("MATCHED_GAME".to_string())),
            (FeatureKey::TeamStats, FeatureValue::IntVector(vec![1, 0, -1])),
            (
                FeatureKey::PlayerTiers,
                FeatureValue::TextVector(tiers.iter().map(|t| t.to_string()).collect()),
            ),
            (FeatureKey::CurrentGold, FeatureValue::Series(series)),
            (FeatureKey::Buildings, FeatureValue::Grid(grid)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_pad_then_slice_is_lossless() {
        let original = array![[1.0, 2.0, -1.0], [4.0, 3.0, 1.0]];
        let padded = pad_frames(&original, 5).unwrap();

        assert_eq!(padded.dim(), (5, 3));
        assert_eq!(padded.slice(s![..2, ..]), original);
        assert!(padded.slice(s![2.., ..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pad_too_long_fails() {
        let original = Array2::<f64>::zeros((4, 3));
        assert!(matches!(
            pad_frames(&original, 3),
            Err(FeatureError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_tensorize_shapes() {
        let sets = vec![
            make_set(2, ["GOLD", "UNRANKED"]),
            make_set(4, ["CHALLENGER", "BRONZE"]),
        ];
        let corpus = tensorize_sets(&sets).unwrap();

        assert_eq!(corpus.num_matches, 2);
        assert_eq!(corpus.max_frames, 4);
        assert_eq!(corpus.get(FeatureKey::CurrentGold).unwrap().shape(), vec![2, 4, 3]);
        assert_eq!(corpus.get(FeatureKey::Buildings).unwrap().shape(), vec![2, 4, 3, 5]);
        assert_eq!(corpus.get(FeatureKey::NumFrames).unwrap().shape(), vec![2]);
        assert_eq!(corpus.get(FeatureKey::TeamStats).unwrap().shape(), vec![2, 3]);
        assert_eq!(
            corpus.get(FeatureKey::GameTypes),
            Some(&TensorValue::Text(vec![
                "MATCHED_GAME".to_string(),
                "MATCHED_GAME".to_string()
            ]))
        );

        let tiers = corpus.int(FeatureKey::PlayerTiers).unwrap();
        assert_eq!(tiers.as_slice().unwrap(), &[3i64, 0, 7, 1]);

        // Real frames untouched, padding appended
        let gold = corpus.float(FeatureKey::CurrentGold).unwrap();
        let original = sets[0].get(FeatureKey::CurrentGold).unwrap().as_series().unwrap();
        assert_eq!(gold.slice(s![0, ..2, ..]), *original);
        assert!(gold.slice(s![0, 2.., ..]).iter().all(|&v| v == 0.0));
        let longest = sets[1].get(FeatureKey::CurrentGold).unwrap().as_series().unwrap();
        assert_eq!(gold.slice(s![1, .., ..]), *longest);
    }

    #[test]
    fn test_unknown_tier_is_hard_error() {
        let sets = vec![make_set(2, ["GOLD", "IRON"])];
        let err = tensorize_sets(&sets).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownCategory { kind: "rank tier", .. }));
    }

    #[test]
    fn test_mixed_value_kinds() {
        let mut odd = make_set(2, ["GOLD", "GOLD"]);
        odd.insert(FeatureKey::Winners, FeatureValue::Text("yes".to_string()));
        let err = tensorize_sets(&[make_set(2, ["GOLD", "GOLD"]), odd]).unwrap_err();
        assert!(matches!(err, FeatureError::ShapeMismatch(_)));
    }

    #[test]
    fn test_rescale_range() {
        let values = array![[-50.0, 0.0], [25.0, 150.0]];
        let scaled = rescale(&values, -1.0, 1.0);
        assert_eq!(scaled[[0, 0]], -1.0);
        assert_eq!(scaled[[1, 1]], 1.0);
        assert!((scaled[[0, 1]] - -0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rescale_inverse() {
        let values = array![[3.0, -7.5, 12.25], [0.0, 1e4, -42.0]];
        let min = values.fold(f64::INFINITY, |a, &v| a.min(v));
        let max = values.fold(f64::NEG_INFINITY, |a, &v| a.max(v));

        let restored = rescale(&rescale(&values, -1.0, 1.0), min, max);
        for (a, b) in values.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_rescale_constant_array() {
        let values = Array2::from_elem((3, 3), 5.0);
        let scaled = rescale(&values, -1.0, 1.0);
        assert!(scaled.iter().all(|&v| v == -1.0));

        let empty = Array1::<f64>::zeros(0);
        assert!(rescale(&empty, -1.0, 1.0).is_empty());
    }

    #[test]
    fn test_corpus_rescaled_only_per_frame() {
        let corpus = tensorize_sets(&[make_set(3, ["GOLD", "GOLD"])]).unwrap();
        let scaled = corpus.rescaled(&TensorConfig::default()).unwrap();

        let gold = scaled.float(FeatureKey::CurrentGold).unwrap();
        assert!(gold.iter().all(|&v| (-1.0..=1.0).contains(&v)));
        assert_eq!(scaled.get(FeatureKey::NumFrames), corpus.get(FeatureKey::NumFrames));
    }

    #[test]
    fn test_rescaled_keeps_padding_zero() {
        let mut short = make_set(1, ["GOLD", "GOLD"]);
        short.insert(
            FeatureKey::CurrentGold,
            FeatureValue::Series(array![[500.0, 600.0, -100.0]]),
        );
        let mut long = make_set(3, ["GOLD", "GOLD"]);
        long.insert(
            FeatureKey::CurrentGold,
            FeatureValue::Series(array![
                [500.0, 700.0, -200.0],
                [800.0, 900.0, -100.0],
                [1000.0, 600.0, 400.0]
            ]),
        );
        let corpus = tensorize_sets(&[short, long]).unwrap();
        let scaled = corpus.rescaled(&TensorConfig::default()).unwrap();
        let gold = scaled.float(FeatureKey::CurrentGold).unwrap();

        // Padded frames of the short match are still zero
        assert!(gold.slice(s![0, 1.., ..]).iter().all(|&v| v == 0.0));
        // Bounds come from real frames only: -200 -> -1, 1000 -> 1
        assert_eq!(gold[[1, 0, 2]], -1.0);
        assert_eq!(gold[[1, 2, 0]], 1.0);
        assert!((gold[[0, 0, 0]] - 0.166_666_666_666_666_6).abs() < 1e-9);

        let buildings = scaled.float(FeatureKey::Buildings).unwrap();
        assert!(buildings.slice(s![0, 1.., .., ..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rescaled_needs_frame_counts() {
        let mut set = make_set(2, ["GOLD", "GOLD"]);
        set.insert(FeatureKey::NumFrames, FeatureValue::Text("two".to_string()));
        let corpus = tensorize(&transpose(&[set]).unwrap(), 2).unwrap();
        assert!(matches!(
            corpus.rescaled(&TensorConfig::default()),
            Err(FeatureError::ShapeMismatch(_))
        ));
    }
}
