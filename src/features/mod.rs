//! Feature extraction and tensorization
//!
//! Converts raw match and timeline records into model-ready features.

pub mod aggregator;
pub mod assembler;
pub mod batch;
pub mod categories;
pub mod feature_set;
pub mod static_features;
pub mod tensorize;
pub mod transpose;
pub mod validator;

pub use aggregator::FrameAggregates;
pub use assembler::{assemble, extract};
pub use batch::{FeatureBatch, FeatureBatcher};
pub use feature_set::{FeatureKey, FeatureSet, FeatureValue};
pub use static_features::StaticFeatures;
pub use tensorize::{rescale, tensorize, tensorize_sets, TensorCorpus, TensorValue};
pub use transpose::{transpose, FeatureColumns};
pub use validator::{is_valid_match, validate};
