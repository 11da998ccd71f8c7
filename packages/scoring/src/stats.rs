//! Summary statistics over score maps.

use std::collections::{BTreeMap, BTreeSet};

/// Rounds to one decimal place.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean score, optionally restricted to `ids`, rounded to one decimal and
/// clamped to `[0, 100]`. Ids without a score are skipped; no scores at
/// all yields `0`.
#[must_use]
pub fn average<V: Copy + Into<f64>>(scores: &BTreeMap<String, V>, ids: Option<&[&str]>) -> f64 {
    let values: Vec<f64> = match ids {
        Some(ids) => ids
            .iter()
            .filter_map(|id| scores.get(*id))
            .map(|v| (*v).into())
            .collect(),
        None => scores.values().map(|v| (*v).into()).collect(),
    };

    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    round_tenth(mean).clamp(0.0, 100.0)
}

/// Per-district change from `before` to `after`, rounded to one decimal.
///
/// Covers `ids` when given, else every id present in either map. Missing
/// scores count as zero.
#[must_use]
pub fn delta_scores<V: Copy + Into<f64>>(
    before: &BTreeMap<String, V>,
    after: &BTreeMap<String, V>,
    ids: Option<&[&str]>,
) -> BTreeMap<String, f64> {
    let keys: BTreeSet<String> = ids.map_or_else(
        || before.keys().chain(after.keys()).cloned().collect(),
        |ids| ids.iter().map(ToString::to_string).collect(),
    );

    let value_of = |map: &BTreeMap<String, V>, id: &str| map.get(id).map_or(0.0, |v| (*v).into());

    keys.into_iter()
        .map(|id| {
            let delta = round_tenth(value_of(after, &id) - value_of(before, &id));
            (id, delta)
        })
        .collect()
}
