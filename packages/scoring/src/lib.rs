#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalization, weighted base scores, and score statistics.
//!
//! Everything here is a pure function of its input. The base score is the
//! deterministic baseline the pipeline falls back to whenever the external
//! model cannot refine it.

pub mod base;
pub mod final_scores;
pub mod normalize;
pub mod stats;
pub mod timeline;

pub use base::{BaseScores, DistrictScore, compute_base_scores};
pub use final_scores::{Adjustment, FinalScoreMap};
pub use normalize::{NormalizedScores, normalize};
