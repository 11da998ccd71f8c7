//! Name matching rules that join raw dataset rows to roster districts.
//!
//! Three datasets name districts three different ways: the crime ledger
//! uses city-prefixed column names (`"서울 강남구"`), the five-major-crime
//! index uses bare display names (`"강남구"`), and the police dataset names
//! stations (`"서울강남서"`). Station resolution is ordered: exact override,
//! then longest district token contained in the station name, then discard.

use std::collections::BTreeMap;

use crate::{DistrictRoster, StationOverride};

/// District name suffix stripped to build station match tokens.
const DISTRICT_SUFFIX: &str = "구";

/// Tokens shorter than this are too ambiguous to match inside a station
/// name (`"중구"` would become `"중"`). Such districts rely on overrides.
const MIN_TOKEN_CHARS: usize = 2;

/// How a police station name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationMatch<'a> {
    /// Matched the override table exactly.
    Override(&'a str),
    /// The station name contains a district token.
    Token {
        /// The token that matched.
        token: &'a str,
        /// District id.
        district: &'a str,
    },
    /// Station of this city that no rule resolves.
    Unmatched,
    /// Station name without the city prefix; discarded.
    ForeignCity,
}

impl<'a> StationMatch<'a> {
    /// The resolved district id, if any.
    #[must_use]
    pub const fn district(&self) -> Option<&'a str> {
        match *self {
            Self::Override(district) | Self::Token { district, .. } => Some(district),
            Self::Unmatched | Self::ForeignCity => None,
        }
    }
}

/// Lookup tables derived from a [`DistrictRoster`] and station overrides.
#[derive(Debug, Clone)]
pub struct DistrictLookup {
    city: String,
    by_name: BTreeMap<String, String>,
    by_ledger_key: BTreeMap<String, String>,
    tokens: Vec<(String, String)>,
    overrides: BTreeMap<String, String>,
}

impl DistrictLookup {
    /// Builds the lookup tables.
    #[must_use]
    pub fn new(roster: &DistrictRoster, overrides: &[StationOverride]) -> Self {
        let by_name = roster
            .districts
            .iter()
            .map(|d| (d.name.clone(), d.id.clone()))
            .collect();

        let by_ledger_key = roster
            .districts
            .iter()
            .map(|d| (format!("{} {}", roster.city, d.name), d.id.clone()))
            .collect();

        let mut tokens: Vec<(String, String)> = roster
            .districts
            .iter()
            .map(|d| {
                let token = d.name.strip_suffix(DISTRICT_SUFFIX).unwrap_or(&d.name);
                (token.to_string(), d.id.clone())
            })
            .filter(|(token, _)| token.chars().count() >= MIN_TOKEN_CHARS)
            .collect();
        // Longest first so "동대문" is tried before any shorter token it contains.
        tokens.sort_by_key(|(token, _)| std::cmp::Reverse(token.chars().count()));

        let overrides = overrides
            .iter()
            .map(|o| (o.station.clone(), o.district.clone()))
            .collect();

        Self {
            city: roster.city.clone(),
            by_name,
            by_ledger_key,
            tokens,
            overrides,
        }
    }

    /// Lookup over the embedded roster and override table.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(crate::roster(), crate::station_overrides())
    }

    /// Resolves a bare display name (`"강남구"`).
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Resolves a city-prefixed crime ledger column (`"서울 강남구"`).
    /// Columns of other regions and non-district columns return `None`.
    #[must_use]
    pub fn id_for_ledger_key(&self, key: &str) -> Option<&str> {
        self.by_ledger_key.get(key).map(String::as_str)
    }

    /// Resolves a police station name to a district.
    #[must_use]
    pub fn resolve_station(&self, station: &str) -> StationMatch<'_> {
        if !station.starts_with(&self.city) {
            return StationMatch::ForeignCity;
        }

        if let Some(district) = self.overrides.get(station) {
            return StationMatch::Override(district.as_str());
        }

        self.tokens
            .iter()
            .find(|(token, _)| station.contains(token.as_str()))
            .map_or(StationMatch::Unmatched, |(token, district)| {
                StationMatch::Token {
                    token: token.as_str(),
                    district: district.as_str(),
                }
            })
    }
}
