//! Per-district accumulated totals of one data source.

use std::collections::BTreeMap;

use risk_map_district::DistrictRoster;
use serde::Serialize;

/// Accumulated total per district id for one data source.
///
/// Always holds exactly one entry per roster district, starting at zero.
/// Only ever mutated by addition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SourceTotals {
    totals: BTreeMap<String, f64>,
}

impl SourceTotals {
    /// Zeroed totals for the given district ids.
    pub fn zeroed<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            totals: ids.into_iter().map(|id| (id.to_string(), 0.0)).collect(),
        }
    }

    /// Zeroed totals covering the full roster.
    #[must_use]
    pub fn for_roster(roster: &DistrictRoster) -> Self {
        Self::zeroed(roster.ids())
    }

    /// Adds `value` to a district's total, saturating at the largest finite
    /// `f64`. Ids outside the key set are ignored; returns whether the id
    /// was known.
    pub fn add(&mut self, id: &str, value: f64) -> bool {
        self.totals.get_mut(id).is_some_and(|total| {
            *total = (*total + value).clamp(f64::MIN, f64::MAX);
            true
        })
    }

    /// Total of a district; zero for unknown ids.
    #[must_use]
    pub fn get(&self, id: &str) -> f64 {
        self.totals.get(id).copied().unwrap_or(0.0)
    }

    /// Iterates `(district id, total)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(id, total)| (id.as_str(), *total))
    }

    /// Number of districts covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether no districts are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// The underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.totals
    }
}

impl<'a> FromIterator<(&'a str, f64)> for SourceTotals {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        Self {
            totals: iter
                .into_iter()
                .map(|(id, total)| (id.to_string(), total))
                .collect(),
        }
    }
}
