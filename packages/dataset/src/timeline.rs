//! City-wide row selection for the yearly risk timeline.
//!
//! The timeline uses one city-wide row from the latest five-major-crime
//! snapshot and one from the latest 112 call statistics snapshot. Both
//! portals publish the city total as a `소계` row, but older exports lack
//! it, so each selector falls back to a looser match and then to the first
//! row.

use std::collections::BTreeMap;

use crate::RawRow;
use crate::five::{GROUP_COLUMN, NAME_COLUMN, SUBTOTAL_MARKER};
use crate::parsing::{text, year_values};

/// Column holding the 112 statistic group.
pub const ONEONETWO_GROUP_COLUMN: &str = "현황별(1)";
/// Column holding the 112 statistic sub-group.
pub const ONEONETWO_NAME_COLUMN: &str = "현황별(2)";
/// Sub-group value of total rows in both portals.
pub const TOTAL_MARKER: &str = "소계";
/// Substring identifying 112 call groups.
const ONEONETWO_GROUP_TAG: &str = "112";

/// Picks the city-wide row of a five-major-crime snapshot.
#[must_use]
pub fn five_city_row(rows: &[RawRow]) -> Option<&RawRow> {
    rows.iter()
        .find(|row| {
            text(row, GROUP_COLUMN) == Some(SUBTOTAL_MARKER)
                && text(row, NAME_COLUMN) == Some(TOTAL_MARKER)
        })
        .or_else(|| {
            rows.iter()
                .find(|row| text(row, GROUP_COLUMN) == Some(SUBTOTAL_MARKER))
        })
        .or_else(|| rows.first())
}

/// Picks the city-wide row of a 112 call statistics snapshot.
#[must_use]
pub fn oneonetwo_city_row(rows: &[RawRow]) -> Option<&RawRow> {
    rows.iter()
        .find(|row| {
            text(row, ONEONETWO_GROUP_COLUMN).is_some_and(|g| g.contains(ONEONETWO_GROUP_TAG))
                && text(row, ONEONETWO_NAME_COLUMN) == Some(TOTAL_MARKER)
        })
        .or_else(|| rows.first())
}

/// Year-labeled values of the selected row, or an empty map.
#[must_use]
pub fn yearly_totals(row: Option<&RawRow>) -> BTreeMap<u16, f64> {
    row.map(year_values).unwrap_or_default()
}
