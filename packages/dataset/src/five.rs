//! Five-major-crime index aggregation.
//!
//! The index has one row per (district, crime category) plus a subtotal row
//! per district, marked with `합계` in the group column. Only subtotal rows
//! are counted, so categories are not added twice.

use risk_map_district::DistrictLookup;
use risk_map_district_models::AggregationMode;

use crate::parsing::{text, year_values};
use crate::{RawRow, SourceTotals};

/// Column holding the row group (`합계` for subtotal rows).
pub const GROUP_COLUMN: &str = "자치구별(1)";
/// Column holding the district display name.
pub const NAME_COLUMN: &str = "자치구별(2)";
/// Group value marking a district subtotal row.
pub const SUBTOTAL_MARKER: &str = "합계";

/// Folds five-category rows into `totals`.
///
/// [`AggregationMode::Cumulative`] adds every year column of each subtotal
/// row; [`AggregationMode::Latest`] adds only the most recent year column.
/// When several snapshot files repeat a year, cumulative mode counts that
/// year once per file.
pub fn fold_rows<'a>(
    rows: impl IntoIterator<Item = &'a RawRow>,
    lookup: &DistrictLookup,
    mode: AggregationMode,
    totals: &mut SourceTotals,
) {
    for row in rows {
        if text(row, GROUP_COLUMN) != Some(SUBTOTAL_MARKER) {
            continue;
        }
        let Some(id) = text(row, NAME_COLUMN).and_then(|name| lookup.id_for_name(name)) else {
            continue;
        };

        let years = year_values(row);
        let value: f64 = match mode {
            AggregationMode::Cumulative => years.values().sum(),
            AggregationMode::Latest => years.last_key_value().map_or(0.0, |(_, v)| *v),
        };
        totals.add(id, value);
    }
}
