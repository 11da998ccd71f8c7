//! Crime ledger aggregation.
//!
//! Ledger rows are keyed by crime category columns plus one column per
//! region, named `"<city> <district>"` (e.g. `"서울 강남구"`). Every
//! district column of every row adds to that district's total.

use risk_map_district::DistrictLookup;

use crate::parsing::to_number;
use crate::{RawRow, SourceTotals};

/// Folds crime ledger rows into `totals`. Unrecognized columns are ignored.
pub fn fold_rows<'a>(
    rows: impl IntoIterator<Item = &'a RawRow>,
    lookup: &DistrictLookup,
    totals: &mut SourceTotals,
) {
    for row in rows {
        for (key, value) in row {
            if let Some(id) = lookup.id_for_ledger_key(key) {
                totals.add(id, to_number(Some(value)));
            }
        }
    }
}
