//! Snapshot file discovery and loading.
//!
//! A data directory holds JSON snapshot files whose names sort in recency
//! order (`crime_2022.json` < `crime_2023.json`). [`AggregationMode::Latest`]
//! reads only the last one; [`AggregationMode::Cumulative`] reads all of
//! them in order.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use risk_map_district_models::{AggregationMode, DataSource};
use serde_json::Value;

use crate::{DatasetError, RawRow};

/// Extension of snapshot files.
const SNAPSHOT_EXTENSION: &str = ".json";

/// A snapshot file found in a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// Bare file name, reported back to API clients.
    pub file_name: String,
    /// Full path.
    pub path: PathBuf,
}

/// A snapshot file and its rows.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Bare file name.
    pub file_name: String,
    /// Row objects, in file order.
    pub rows: Vec<RawRow>,
}

/// The snapshots of one data source selected for a run.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Which data source this is.
    pub source: DataSource,
    /// Selected snapshots, oldest first.
    pub snapshots: Vec<Snapshot>,
}

impl Dataset {
    /// A dataset with no snapshots.
    #[must_use]
    pub const fn empty(source: DataSource) -> Self {
        Self {
            source,
            snapshots: Vec::new(),
        }
    }

    /// Names of the files the dataset was read from.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.snapshots.iter().map(|s| s.file_name.clone()).collect()
    }

    /// All rows across all snapshots.
    pub fn rows(&self) -> impl Iterator<Item = &RawRow> {
        self.snapshots.iter().flat_map(|s| s.rows.iter())
    }

    /// Total number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.snapshots.iter().map(|s| s.rows.len()).sum()
    }

    /// Whether no snapshot file was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Lists the snapshot files in `dir`, sorted lexicographically.
///
/// A missing directory is treated as an empty one.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the directory exists but cannot be read.
pub async fn list_snapshots(dir: &Path) -> Result<Vec<SnapshotFile>, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("Data directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_err(e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };
        if file_name.ends_with(SNAPSHOT_EXTENSION) {
            files.push(SnapshotFile {
                path: entry.path(),
                file_name,
            });
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Picks the files to read under `mode`.
#[must_use]
pub fn select_snapshots(mut files: Vec<SnapshotFile>, mode: AggregationMode) -> Vec<SnapshotFile> {
    match mode {
        AggregationMode::Cumulative => files,
        AggregationMode::Latest => files.pop().into_iter().collect(),
    }
}

/// Reads one snapshot file. Array entries that are not objects are skipped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or is not a JSON
/// array.
pub async fn read_snapshot(file: &SnapshotFile) -> Result<Snapshot, DatasetError> {
    let raw = tokio::fs::read_to_string(&file.path)
        .await
        .map_err(|source| DatasetError::Io {
            path: file.path.clone(),
            source,
        })?;

    let values: Vec<Value> = serde_json::from_str(&raw).map_err(|source| DatasetError::Json {
        path: file.path.clone(),
        source,
    })?;

    let rows = values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();

    Ok(Snapshot {
        file_name: file.file_name.clone(),
        rows,
    })
}

/// Loads the snapshots of `source` from `dir` under `mode`.
///
/// Optional sources with no files yield an empty [`Dataset`].
///
/// # Errors
///
/// Returns [`DatasetError::NotFound`] if `source` is required and `dir`
/// holds no snapshot files, or any error from reading the files.
pub async fn load_dataset(
    dir: &Path,
    source: DataSource,
    mode: AggregationMode,
) -> Result<Dataset, DatasetError> {
    let files = select_snapshots(list_snapshots(dir).await?, mode);

    if files.is_empty() {
        if source.is_required() {
            return Err(DatasetError::NotFound {
                dataset: source,
                dir: dir.to_path_buf(),
            });
        }
        log::info!(
            "No {source} data files in {}; its totals will be zero",
            dir.display()
        );
        return Ok(Dataset::empty(source));
    }

    log::debug!(
        "Reading {source} snapshots: {}",
        files
            .iter()
            .map(|f| f.file_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut snapshots = Vec::with_capacity(files.len());
    for file in &files {
        snapshots.push(read_snapshot(file).await?);
    }

    Ok(Dataset { source, snapshots })
}
