//! Min–max normalization.

use std::collections::BTreeMap;

use risk_map_dataset::SourceTotals;

/// Value assigned to every entry when all inputs are equal.
pub const TIE_VALUE: f64 = 0.5;

/// Per-district value in `[0, 1]` derived from a [`SourceTotals`].
pub type NormalizedScores = BTreeMap<String, f64>;

/// Min–max normalizes any keyed series into `[0, 1]`.
///
/// When every value is equal (including a single entry) each key gets
/// [`TIE_VALUE`], so a uniform series is neither divided by zero nor read
/// as minimal. Finite inputs always land in `[0, 1]`, even when `max - min`
/// overflows.
#[must_use]
pub fn min_max<K: Ord + Clone>(values: &BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    let min = values.values().copied().fold(f64::INFINITY, f64::min);
    let max = values.values().copied().fold(f64::NEG_INFINITY, f64::max);
    // Halving keeps the range finite for any pair of finite bounds.
    let range = max.mul_add(0.5, -min * 0.5);

    values
        .iter()
        .map(|(key, value)| {
            let normalized = if range > 0.0 {
                (value.mul_add(0.5, -min * 0.5) / range).clamp(0.0, 1.0)
            } else {
                TIE_VALUE
            };
            (key.clone(), normalized)
        })
        .collect()
}

/// Normalizes one source's totals across all districts.
#[must_use]
pub fn normalize(totals: &SourceTotals) -> NormalizedScores {
    min_max(totals.as_map())
}
