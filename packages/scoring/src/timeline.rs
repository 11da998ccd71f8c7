//! City-wide yearly risk trend.
//!
//! Combines the city total of the five-major-crime index with the city
//! total of 112 emergency calls. Each series is min–max normalized across
//! the years both series cover, then fused into a 0-100 score per year.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::normalize::min_max;

/// Fusion weights of the timeline series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineWeights {
    /// Weight of the five-major-crime series.
    pub five: f64,
    /// Weight of the 112 call series.
    pub oneonetwo: f64,
}

impl TimelineWeights {
    /// The weights used for the timeline.
    pub const STANDARD: Self = Self {
        five: 0.6,
        oneonetwo: 0.4,
    };
}

impl Default for TimelineWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// One year of the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Calendar year.
    pub year: u16,
    /// Fused score in `[0, 100]`.
    pub score: u8,
    /// City five-major-crime total for the year.
    pub five_total: f64,
    /// City 112 call total for the year.
    pub oneonetwo_total: f64,
}

/// Scores every year present in both series, in ascending year order.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_timeline(
    five: &BTreeMap<u16, f64>,
    oneonetwo: &BTreeMap<u16, f64>,
    weights: &TimelineWeights,
) -> Vec<TimelinePoint> {
    let shared_five: BTreeMap<u16, f64> = five
        .iter()
        .filter(|(year, _)| oneonetwo.contains_key(year))
        .map(|(year, value)| (*year, *value))
        .collect();
    let shared_one: BTreeMap<u16, f64> = shared_five
        .keys()
        .filter_map(|year| oneonetwo.get(year).map(|value| (*year, *value)))
        .collect();

    let five_norm = min_max(&shared_five);
    let one_norm = min_max(&shared_one);

    shared_five
        .iter()
        .map(|(year, five_total)| {
            let weighted =
                five_norm[year] * weights.five + one_norm[year] * weights.oneonetwo;
            TimelinePoint {
                year: *year,
                score: (weighted * 100.0).round().clamp(0.0, 100.0) as u8,
                five_total: *five_total,
                oneonetwo_total: shared_one[year],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(u16, f64)]) -> BTreeMap<u16, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn scores_only_shared_years() {
        let five = series(&[(2019, 100.0), (2020, 200.0), (2021, 300.0)]);
        let one = series(&[(2020, 10.0), (2021, 30.0), (2022, 50.0)]);
        let points = compute_timeline(&five, &one, &TimelineWeights::STANDARD);

        let years: Vec<u16> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, [2020, 2021]);
        assert_eq!(points[0].score, 0);
        assert_eq!(points[1].score, 100);
        assert!((points[1].oneonetwo_total - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mixed_series_use_both_weights() {
        let five = series(&[(2020, 0.0), (2021, 10.0)]);
        let one = series(&[(2020, 10.0), (2021, 0.0)]);
        let points = compute_timeline(&five, &one, &TimelineWeights::STANDARD);
        assert_eq!(points[0].score, 40);
        assert_eq!(points[1].score, 60);
    }

    #[test]
    fn flat_series_score_fifty() {
        let five = series(&[(2020, 5.0), (2021, 5.0)]);
        let one = series(&[(2020, 1.0), (2021, 1.0)]);
        let points = compute_timeline(&five, &one, &TimelineWeights::STANDARD);
        assert!(points.iter().all(|p| p.score == 50));
    }

    #[test]
    fn disjoint_series_yield_no_points() {
        let five = series(&[(2019, 1.0)]);
        let one = series(&[(2020, 1.0)]);
        assert!(compute_timeline(&five, &one, &TimelineWeights::STANDARD).is_empty());
    }
}
