#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District, data source, and risk level types.
//!
//! This crate defines the vocabulary shared by every stage of the risk
//! pipeline: the districts that must always be scored, the raw datasets
//! that feed the score, the policy used to pick snapshot files, and the
//! weights used to fuse the sources.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A district of the city. Static reference data loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    /// Stable slug used as the key of every score map (e.g. `"gangnam"`).
    pub id: String,
    /// Localized display name used as the join key into raw datasets
    /// (e.g. `"강남구"`).
    pub name: String,
    /// Romanized name (e.g. `"Gangnam-gu"`).
    pub name_en: String,
}

/// A raw dataset feeding the risk pipeline.
///
/// The string form doubles as the name of the data directory holding the
/// dataset's snapshot files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
    /// Crime ledger with city-prefixed district columns. Required.
    Crime,
    /// Five-major-crime index with per-year columns.
    Five,
    /// Per-police-station incident counts.
    PoliceStation,
    /// 112 emergency call statistics (timeline only).
    OneOneTwo,
}

impl DataSource {
    /// The three sources fused into the district base score.
    pub const SCORING: [Self; 3] = [Self::Crime, Self::Five, Self::PoliceStation];

    /// Name of the directory (under the data root) holding this source.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Crime => "crime",
            Self::Five => "five",
            Self::PoliceStation => "policestation",
            Self::OneOneTwo => "oneonetwo",
        }
    }

    /// Whether the pipeline refuses to run without this source.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Crime)
    }
}

/// Which snapshot files of a dataset directory are aggregated.
///
/// Files are sorted lexicographically; later names are newer.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AggregationMode {
    /// Only the most recent file, and only the most recent year column of
    /// year-labeled rows.
    Latest,
    /// Every file, and every year column.
    #[default]
    Cumulative,
}

/// Fixed fusion weights of the three scoring sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceWeights {
    /// Weight of the crime ledger.
    pub crime: f64,
    /// Weight of the five-major-crime index.
    pub five: f64,
    /// Weight of the police-station incidents.
    pub police: f64,
}

impl SourceWeights {
    /// The weights used for every base score.
    pub const STANDARD: Self = Self {
        crime: 0.45,
        five: 0.35,
        police: 0.20,
    };

    /// Weight assigned to a scoring source. `OneOneTwo` does not take part
    /// in the district score and weighs zero.
    #[must_use]
    pub const fn for_source(&self, source: DataSource) -> f64 {
        match source {
            DataSource::Crime => self.crime,
            DataSource::Five => self.five,
            DataSource::PoliceStation => self.police,
            DataSource::OneOneTwo => 0.0,
        }
    }
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Coarse risk band of a 0-100 score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Scores up to 33.
    Low,
    /// Scores from 34 to 66.
    Mid,
    /// Scores above 66.
    High,
}

impl RiskLevel {
    /// Classifies a score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score <= 33.0 {
            Self::Low
        } else if score <= 66.0 {
            Self::Mid
        } else {
            Self::High
        }
    }

    /// Korean label shown next to a score.
    #[must_use]
    pub const fn label_ko(self) -> &'static str {
        match self {
            Self::Low => "낮음",
            Self::Mid => "중간",
            Self::High => "높음",
        }
    }
}
