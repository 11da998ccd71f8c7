#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Snapshot file loaders and per-district totals aggregation.
//!
//! Each data directory holds one or more JSON snapshot files, each an array
//! of flat row objects. [`files::load_dataset`] picks and reads the files
//! according to an [`AggregationMode`]; [`aggregate`] folds the rows of one
//! dataset into a [`SourceTotals`] keyed by district id.

pub mod crime;
pub mod files;
pub mod five;
pub mod parsing;
pub mod police;
pub mod timeline;
pub mod totals;

use std::path::PathBuf;

use risk_map_district::{DistrictLookup, DistrictRoster};
use risk_map_district_models::{AggregationMode, DataSource};

pub use files::{Dataset, Snapshot, SnapshotFile, load_dataset};
pub use totals::SourceTotals;

/// A raw dataset row: column name to cell value.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur while loading datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error reading a data directory or file.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A snapshot file is not a JSON array.
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// A required dataset directory has no snapshot files.
    #[error("No {dataset} data files found in {}", dir.display())]
    NotFound {
        /// Which dataset is missing.
        dataset: DataSource,
        /// Directory that was searched.
        dir: PathBuf,
    },
}

/// Folds every row of `dataset` into fresh totals covering the full roster.
#[must_use]
pub fn aggregate(
    dataset: &Dataset,
    roster: &DistrictRoster,
    lookup: &DistrictLookup,
    mode: AggregationMode,
) -> SourceTotals {
    let mut totals = SourceTotals::for_roster(roster);
    let rows = dataset.rows();

    match dataset.source {
        DataSource::Crime => crime::fold_rows(rows, lookup, &mut totals),
        DataSource::Five => five::fold_rows(rows, lookup, mode, &mut totals),
        DataSource::PoliceStation => police::fold_rows(rows, lookup, &mut totals),
        DataSource::OneOneTwo => {
            log::warn!("112 call statistics carry no district breakdown; totals stay zero");
        }
    }

    log::debug!(
        "Aggregated {} rows from {} file(s) of {} into {} districts",
        dataset.row_count(),
        dataset.snapshots.len(),
        dataset.source,
        totals.len()
    );

    totals
}
