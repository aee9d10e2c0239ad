//! Location name to district resolution.
//!
//! The mapping is a closed, hand-curated table: there is no fuzzy or
//! partial matching. A location resolves only if its normalized form
//! (trimmed and title-cased) equals a normalized table key; everything
//! else resolves to [`UNKNOWN_DISTRICT`].
//!
//! The embedded table is the one curated for the Delhi NCR bookings
//! dataset. Another table with the same TOML shape can be loaded with
//! [`LocationDistrictMap::from_path`].

use std::collections::BTreeMap;
use std::path::Path;

use ride_map_ride_models::{RideRecord, ResolvedRide};
use serde::Deserialize;

use crate::DistrictError;

/// District assigned to locations missing from the table.
pub const UNKNOWN_DISTRICT: &str = "UNKNOWN";

/// Number of entries in the embedded table. Enforced by a test.
#[cfg(test)]
const EXPECTED_LOCATION_COUNT: usize = 176;

const EMBEDDED_TABLE: &str = include_str!("../data/location_districts.toml");

#[derive(Debug, Deserialize)]
struct LocationTableFile {
    locations: BTreeMap<String, String>,
}

/// A literal table entry that does not survive normalization unchanged.
///
/// These are reported rather than rewritten: the table stays the source
/// of truth and whoever curates it decides how to fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAsymmetry {
    /// The key is not in trimmed title-case form, so it only matches
    /// through normalization (e.g. `AIIMS` is stored as `Aiims`).
    NotNormalized {
        /// Key as written in the table.
        raw: String,
        /// Key the lookup actually matches.
        normalized: String,
    },
    /// Two keys normalize to the same string. The first one wins.
    Collision {
        /// Key that was dropped.
        raw: String,
        /// Shared normalized key.
        normalized: String,
        /// District kept for the normalized key.
        kept: String,
        /// District of the dropped key.
        dropped: String,
    },
}

/// Immutable location → district mapping.
#[derive(Debug, Clone)]
pub struct LocationDistrictMap {
    entries: BTreeMap<String, String>,
    asymmetries: Vec<TableAsymmetry>,
}

impl LocationDistrictMap {
    /// Parses the table embedded in this crate.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError::Toml`] if the embedded table is malformed,
    /// which indicates a development error caught by tests.
    pub fn embedded() -> Result<Self, DistrictError> {
        Self::from_toml_str(EMBEDDED_TABLE)
    }

    /// Loads a table from a TOML file with a `[locations]` section.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, DistrictError> {
        let contents = std::fs::read_to_string(path)?;
        let map = Self::from_toml_str(&contents)?;
        log::info!(
            "Loaded {} location mappings from {}",
            map.len(),
            path.display()
        );
        Ok(map)
    }

    /// Parses a table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DistrictError::Toml`] if the text is not a valid table.
    pub fn from_toml_str(contents: &str) -> Result<Self, DistrictError> {
        let file: LocationTableFile = toml::de::from_str(contents)?;
        Ok(Self::from_entries(file.locations))
    }

    /// Builds the mapping from `(location, district)` pairs.
    ///
    /// Keys are normalized with [`normalize_location`]; any key that
    /// changes under normalization, or collides with an earlier key, is
    /// recorded in [`Self::asymmetries`] and logged.
    pub fn from_entries<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();
        let mut asymmetries = Vec::new();

        for (raw, district) in pairs {
            let raw: String = raw.into();
            let district: String = district.into();
            let normalized = normalize_location(&raw);

            if normalized != raw {
                log::debug!("Location key '{raw}' only matches as '{normalized}'");
                asymmetries.push(TableAsymmetry::NotNormalized {
                    raw: raw.clone(),
                    normalized: normalized.clone(),
                });
            }

            if let Some(kept) = entries.get(&normalized) {
                log::warn!(
                    "Location key '{raw}' collides with an earlier key as '{normalized}' \
                     (keeping {kept}, dropping {district})"
                );
                asymmetries.push(TableAsymmetry::Collision {
                    raw,
                    normalized,
                    kept: kept.clone(),
                    dropped: district,
                });
                continue;
            }

            entries.insert(normalized, district);
        }

        if !asymmetries.is_empty() {
            log::warn!(
                "Location table has {} entries that differ from their normalized form",
                asymmetries.len()
            );
        }

        Self {
            entries,
            asymmetries,
        }
    }

    /// Resolves a location name to its district, or [`UNKNOWN_DISTRICT`].
    #[must_use]
    pub fn resolve_district(&self, location: &str) -> &str {
        self.entries
            .get(&normalize_location(location))
            .map_or(UNKNOWN_DISTRICT, String::as_str)
    }

    /// Resolves both endpoints of a ride.
    #[must_use]
    pub fn resolve_ride(&self, record: RideRecord) -> ResolvedRide {
        let pickup_district = self.resolve_district(&record.pickup_location).to_string();
        let drop_district = self.resolve_district(&record.drop_location).to_string();
        ResolvedRide {
            record,
            pickup_district,
            drop_district,
        }
    }

    /// Resolves every ride, logging how many endpoints stayed unknown.
    #[must_use]
    pub fn resolve_rides(&self, records: Vec<RideRecord>) -> Vec<ResolvedRide> {
        let resolved: Vec<ResolvedRide> =
            records.into_iter().map(|r| self.resolve_ride(r)).collect();

        let unknown = resolved
            .iter()
            .filter(|r| r.pickup_district == UNKNOWN_DISTRICT || r.drop_district == UNKNOWN_DISTRICT)
            .count();
        log::info!(
            "Resolved {} rides to districts ({unknown} with an unknown endpoint)",
            resolved.len()
        );

        resolved
    }

    /// Entries whose literal key differs from the key lookups match.
    #[must_use]
    pub fn asymmetries(&self) -> &[TableAsymmetry] {
        &self.asymmetries
    }

    /// Number of distinct normalized keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalizes a location name for lookup: trims surrounding whitespace
/// and title-cases it.
///
/// Title-casing upper-cases a letter that follows a non-letter (or starts
/// the string) and lower-cases every other letter, so `"IGI airport"`
/// becomes `"Igi Airport"` and `"o'neil"` becomes `"O'Neil"`.
#[must_use]
pub fn normalize_location(location: &str) -> String {
    let trimmed = location.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut after_letter = false;

    for c in trimmed.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded() -> LocationDistrictMap {
        LocationDistrictMap::embedded().unwrap()
    }

    #[test]
    fn embedded_table_loads() {
        let map = embedded();
        assert_eq!(
            map.len(),
            EXPECTED_LOCATION_COUNT,
            "Expected {EXPECTED_LOCATION_COUNT} locations, found {}. \
             Update EXPECTED_LOCATION_COUNT after editing the table.",
            map.len()
        );
    }

    #[test]
    fn embedded_table_has_no_collisions() {
        let collisions: Vec<_> = embedded()
            .asymmetries()
            .iter()
            .filter(|a| matches!(a, TableAsymmetry::Collision { .. }))
            .cloned()
            .collect();
        assert!(collisions.is_empty(), "{collisions:?}");
    }

    #[test]
    fn flags_acronym_keys() {
        let map = embedded();
        assert!(map.asymmetries().contains(&TableAsymmetry::NotNormalized {
            raw: "AIIMS".to_string(),
            normalized: "Aiims".to_string(),
        }));
    }

    #[test]
    fn resolves_known_locations() {
        let map = embedded();
        assert_eq!(map.resolve_district("AIIMS"), "SOUTH");
        assert_eq!(map.resolve_district("Connaught Place"), "CENTRAL");
        assert_eq!(map.resolve_district("Cyber Hub"), "OUTSIDE");
        assert_eq!(map.resolve_district("NEW DELHI Railway Station"), "NEW DELHI");
    }

    #[test]
    fn case_and_whitespace_variants_resolve_identically() {
        let map = embedded();
        for variant in ["AIIMS", "aiims", "Aiims", "  AIIMS\t", "aIiMs "] {
            assert_eq!(map.resolve_district(variant), "SOUTH", "{variant:?}");
        }
        for variant in ["connaught place", "CONNAUGHT PLACE", " Connaught Place "] {
            assert_eq!(map.resolve_district(variant), "CENTRAL", "{variant:?}");
        }
    }

    #[test]
    fn unknown_locations_fall_back() {
        let map = embedded();
        assert_eq!(map.resolve_district("Nowhereville"), UNKNOWN_DISTRICT);
        assert_eq!(map.resolve_district(""), UNKNOWN_DISTRICT);
        assert_eq!(map.resolve_district("Connaught"), UNKNOWN_DISTRICT);
    }

    #[test]
    fn self_mapped_value_is_kept_literally() {
        assert_eq!(embedded().resolve_district("shahdara"), "Shahdara");
    }

    #[test]
    fn collision_keeps_first_entry() {
        let map = LocationDistrictMap::from_entries([("Hauz Khas", "SOUTH"), ("HAUZ KHAS", "WEST")]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve_district("hauz khas"), "SOUTH");
        assert!(map.asymmetries().iter().any(|a| matches!(
            a,
            TableAsymmetry::Collision { kept, dropped, .. } if kept == "SOUTH" && dropped == "WEST"
        )));
    }

    #[test]
    fn title_case_rules() {
        assert_eq!(normalize_location("IGI airport"), "Igi Airport");
        assert_eq!(normalize_location("dwarka sector 21"), "Dwarka Sector 21");
        assert_eq!(normalize_location("o'neil"), "O'Neil");
        assert_eq!(normalize_location("  "), "");
    }

    #[test]
    fn parses_custom_table() {
        let map = LocationDistrictMap::from_toml_str(
            "[locations]\n\"Harbour\" = \"PORT\"\n\"Old Town\" = \"CENTRE\"\n",
        )
        .unwrap();
        assert_eq!(map.resolve_district("old town"), "CENTRE");
        assert!(map.asymmetries().is_empty());
    }

    #[test]
    fn rejects_malformed_table() {
        assert!(LocationDistrictMap::from_toml_str("locations = 3").is_err());
    }
}
