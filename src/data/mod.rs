//! Match file loading
//!
//! Reads match/timeline JSON pairs from disk and collects their features.

pub mod corpus;
pub mod loader;

pub use corpus::MatchCorpus;
pub use loader::{find_timelines, load_features, load_match_pair, match_path_for};
