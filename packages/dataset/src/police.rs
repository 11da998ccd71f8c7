//! Police-station incident aggregation.
//!
//! Rows name a police station rather than a district. Stations are
//! resolved through [`DistrictLookup::resolve_station`]; rows of other
//! cities and unresolvable stations are discarded.

use risk_map_district::{DistrictLookup, StationMatch};

use crate::parsing::{text, to_number};
use crate::{RawRow, SourceTotals};

/// Column holding the station name.
pub const STATION_COLUMN: &str = "경찰서";
/// Incident columns summed per row: homicide, robbery, burglary, violence.
pub const INCIDENT_COLUMNS: [&str; 4] = ["살인", "강도", "절도", "폭력"];

/// Folds police-station rows into `totals`.
pub fn fold_rows<'a>(
    rows: impl IntoIterator<Item = &'a RawRow>,
    lookup: &DistrictLookup,
    totals: &mut SourceTotals,
) {
    let mut discarded = 0_usize;

    for row in rows {
        let station = text(row, STATION_COLUMN).unwrap_or_default();
        let resolved = lookup.resolve_station(station);
        let Some(id) = resolved.district() else {
            if resolved == StationMatch::Unmatched {
                log::debug!("Police station {station} matches no district");
            }
            discarded += 1;
            continue;
        };

        let incidents: f64 = INCIDENT_COLUMNS
            .iter()
            .map(|column| to_number(row.get(*column)))
            .sum();
        totals.add(id, incidents);
    }

    if discarded > 0 {
        log::debug!("Discarded {discarded} police rows without a district");
    }
}
