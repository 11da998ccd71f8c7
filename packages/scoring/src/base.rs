//! Weighted base score.
//!
//! Each source's totals are min–max normalized across districts, fused
//! with [`SourceWeights`], and mapped onto `[BASE_FLOOR, BASE_FLOOR +
//! BASE_SPAN]`. The floor keeps the safest district above zero and the cap
//! keeps the riskiest below 100, so a later adjustment can move scores
//! outward in either direction.

use std::collections::BTreeMap;

use risk_map_dataset::SourceTotals;
use risk_map_district::DistrictRoster;
use risk_map_district_models::{DataSource, SourceWeights};
use serde::Serialize;

use crate::normalize::{NormalizedScores, TIE_VALUE, normalize};

/// Lowest possible base score.
pub const BASE_FLOOR: f64 = 10.0;
/// Width of the base score range.
pub const BASE_SPAN: f64 = 80.0;

/// Raw totals and base score of one district.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictScore {
    /// District id.
    pub id: String,
    /// Crime ledger total.
    pub crime_total: f64,
    /// Five-major-crime total.
    pub five_total: f64,
    /// Police-station incident total.
    pub police_total: f64,
    /// Base score in `[10, 90]`.
    pub base_score: u8,
}

/// Base scores of the full roster, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BaseScores {
    scores: Vec<DistrictScore>,
}

impl BaseScores {
    /// Iterates district scores in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &DistrictScore> {
        self.scores.iter()
    }

    /// Score of one district.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DistrictScore> {
        self.scores.iter().find(|s| s.id == id)
    }

    /// Number of districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the roster was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// District id to base score.
    #[must_use]
    pub fn score_map(&self) -> BTreeMap<String, u8> {
        self.scores
            .iter()
            .map(|s| (s.id.clone(), s.base_score))
            .collect()
    }

    /// Scores sorted by descending base score. Ties keep roster order.
    #[must_use]
    pub fn by_salience(&self) -> Vec<&DistrictScore> {
        let mut sorted: Vec<&DistrictScore> = self.scores.iter().collect();
        sorted.sort_by(|a, b| b.base_score.cmp(&a.base_score));
        sorted
    }
}

/// Maps a weighted sum in `[0, 1]` onto the base score range. `NaN` maps
/// to the floor.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale_base_score(weighted: f64) -> u8 {
    if weighted.is_nan() {
        return BASE_FLOOR as u8;
    }
    let scaled = BASE_SPAN.mul_add(weighted, BASE_FLOOR).round();
    scaled.clamp(BASE_FLOOR, BASE_FLOOR + BASE_SPAN) as u8
}

/// Computes the base score of every roster district.
#[must_use]
pub fn compute_base_scores(
    roster: &DistrictRoster,
    crime: &SourceTotals,
    five: &SourceTotals,
    police: &SourceTotals,
    weights: &SourceWeights,
) -> BaseScores {
    let normalized: Vec<(DataSource, NormalizedScores)> = DataSource::SCORING
        .into_iter()
        .zip([normalize(crime), normalize(five), normalize(police)])
        .collect();

    let scores = roster
        .ids()
        .map(|id| {
            let weighted: f64 = normalized
                .iter()
                .map(|(source, norm)| {
                    weights.for_source(*source) * norm.get(id).copied().unwrap_or(TIE_VALUE)
                })
                .sum();

            DistrictScore {
                id: id.to_string(),
                crime_total: crime.get(id),
                five_total: five.get(id),
                police_total: police.get(id),
                base_score: scale_base_score(weighted),
            }
        })
        .collect();

    BaseScores { scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_map_district::roster;

    fn totals_with(entries: &[(&str, f64)]) -> SourceTotals {
        let mut totals = SourceTotals::for_roster(roster());
        for (id, value) in entries {
            totals.add(id, *value);
        }
        totals
    }

    #[test]
    fn single_hot_district_scores_ninety_and_rest_ten() {
        let crime = totals_with(&[("gangnam", 100.0)]);
        let five = totals_with(&[("gangnam", 80.0)]);
        let police = totals_with(&[("gangnam", 50.0)]);

        let scores = compute_base_scores(roster(), &crime, &five, &police, &SourceWeights::STANDARD);

        assert_eq!(scores.len(), 25);
        assert_eq!(scores.get("gangnam").unwrap().base_score, 90);
        for score in scores.iter().filter(|s| s.id != "gangnam") {
            assert_eq!(score.base_score, 10, "{} should be at the floor", score.id);
        }
    }

    #[test]
    fn uniform_sources_contribute_one_half() {
        let flat = totals_with(&[]);
        let scores = compute_base_scores(roster(), &flat, &flat, &flat, &SourceWeights::STANDARD);
        // 10 + 0.5 * 80
        assert!(scores.iter().all(|s| s.base_score == 50));
    }

    #[test]
    fn missing_secondary_source_only_shifts_scores() {
        let crime = totals_with(&[("gangnam", 10.0), ("mapo", 5.0)]);
        let empty = totals_with(&[]);
        let scores = compute_base_scores(roster(), &crime, &empty, &empty, &SourceWeights::STANDARD);
        // 10 + (0.45 + 0.35 * 0.5 + 0.2 * 0.5) * 80 = 68
        assert_eq!(scores.get("gangnam").unwrap().base_score, 68);
        // 10 + (0.45 * 0.5 + 0.275) * 80 = 50
        assert_eq!(scores.get("mapo").unwrap().base_score, 50);
        // 10 + 0.275 * 80 = 32
        assert_eq!(scores.get("jung").unwrap().base_score, 32);
    }

    #[test]
    fn base_scores_are_monotonic_and_bounded() {
        // A deterministic spread of totals across all districts and sources.
        let ids: Vec<&str> = roster().ids().collect();
        let mut crime = SourceTotals::for_roster(roster());
        let mut five = SourceTotals::for_roster(roster());
        let mut police = SourceTotals::for_roster(roster());
        for (i, id) in ids.iter().enumerate() {
            let i = f64::from(u32::try_from(i).unwrap());
            crime.add(id, (i * 37.0) % 101.0);
            five.add(id, (i * 53.0) % 89.0);
            police.add(id, (i * 17.0) % 23.0);
        }

        let scores = compute_base_scores(roster(), &crime, &five, &police, &SourceWeights::STANDARD);

        for a in scores.iter() {
            assert!((10..=90).contains(&a.base_score));
            for b in scores.iter() {
                let dominates = a.crime_total >= b.crime_total
                    && a.five_total >= b.five_total
                    && a.police_total >= b.police_total;
                if dominates {
                    assert!(
                        a.base_score >= b.base_score,
                        "{} dominates {} but scores lower",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn salience_order_is_descending_and_stable() {
        let crime = totals_with(&[("mapo", 10.0), ("gangnam", 10.0), ("jung", 5.0)]);
        let flat = totals_with(&[]);
        let scores = compute_base_scores(roster(), &crime, &flat, &flat, &SourceWeights::STANDARD);
        let order: Vec<&str> = scores
            .by_salience()
            .iter()
            .take(3)
            .map(|s| s.id.as_str())
            .collect();
        // gangnam precedes mapo in the roster.
        assert_eq!(order, ["gangnam", "mapo", "jung"]);
    }

    #[test]
    fn scale_clamps_out_of_range_input() {
        assert_eq!(scale_base_score(0.0), 10);
        assert_eq!(scale_base_score(1.0), 90);
        assert_eq!(scale_base_score(1.2), 90);
        assert_eq!(scale_base_score(-0.3), 10);
        assert_eq!(scale_base_score(f64::NAN), 10);
        assert_eq!(scale_base_score(f64::INFINITY), 90);
    }

    #[test]
    fn overflowing_totals_stay_in_bounds() {
        let crime = totals_with(&[("gangnam", 1e308), ("gangnam", 1e308)]);
        let flat = totals_with(&[]);

        let scores = compute_base_scores(roster(), &crime, &flat, &flat, &SourceWeights::STANDARD);

        assert!(scores.iter().all(|s| (10..=90).contains(&s.base_score)));
        // 10 + (0.45 + 0.55 * 0.5) * 80
        assert_eq!(scores.get("gangnam").unwrap().base_score, 68);
        // 10 + 0.55 * 0.5 * 80
        assert_eq!(scores.get("mapo").unwrap().base_score, 32);
    }
}
