#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District roster and dataset name matching rules.
//!
//! The roster and the police-station override table are TOML documents
//! baked into the binary at compile time via [`include_str!`]. Changing the
//! city means editing `data/districts.toml` and `data/stations.toml`.

pub mod lookup;

use std::sync::LazyLock;

use risk_map_district_models::District;
use serde::Deserialize;

pub use lookup::{DistrictLookup, StationMatch};

/// Number of districts in the embedded roster. Enforced by a test.
#[cfg(test)]
const EXPECTED_DISTRICT_COUNT: usize = 25;

const DISTRICTS_TOML: &str = include_str!("../data/districts.toml");
const STATIONS_TOML: &str = include_str!("../data/stations.toml");

/// The fixed, ordered list of districts the pipeline always scores.
#[derive(Debug, Clone, Deserialize)]
pub struct DistrictRoster {
    /// City name used as the prefix of district columns and station names
    /// in the raw datasets (e.g. `"서울"`).
    pub city: String,
    /// Districts in roster order.
    pub districts: Vec<District>,
}

impl DistrictRoster {
    /// District ids in roster order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.districts.iter().map(|d| d.id.as_str())
    }

    /// Whether `id` belongs to the roster.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.districts.iter().any(|d| d.id == id)
    }

    /// Number of districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Whether the roster has no districts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

/// A police station pinned to a district regardless of its name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationOverride {
    /// Full station name as it appears in the dataset.
    pub station: String,
    /// District id the station reports into.
    pub district: String,
}

#[derive(Deserialize)]
struct StationTable {
    overrides: Vec<StationOverride>,
}

static ROSTER: LazyLock<DistrictRoster> = LazyLock::new(|| {
    toml::de::from_str(DISTRICTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded district roster: {e}"))
});

static STATION_OVERRIDES: LazyLock<Vec<StationOverride>> = LazyLock::new(|| {
    toml::de::from_str::<StationTable>(STATIONS_TOML)
        .map(|table| table.overrides)
        .unwrap_or_else(|e| panic!("Failed to parse embedded station overrides: {e}"))
});

/// Returns the embedded district roster.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. Since it is a compile-time
/// constant, a parse failure is a development error caught by the tests.
#[must_use]
pub fn roster() -> &'static DistrictRoster {
    &ROSTER
}

/// Returns the embedded police-station override table.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse.
#[must_use]
pub fn station_overrides() -> &'static [StationOverride] {
    &STATION_OVERRIDES
}
