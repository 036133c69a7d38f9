//! Zone classification.
//!
//! SEPOMEX labels each settlement with a free-text zone. The target schema
//! only knows a closed set of categories, so every label is mapped onto the
//! catalog (by default Urbano, Rural and Semiurbano) with unknown or missing
//! labels falling back to the catalog default.

use crate::constants::zones;
use crate::error::{Result, SepomexError};
use crate::normalize::is_absent;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// A canonical zone category and its primary key in the `zonas` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub id: i32,
    pub name: String,
}

/// Immutable zone taxonomy passed to the extractors and the zone script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ZoneCatalogFile", into = "ZoneCatalogFile")]
pub struct ZoneCatalog {
    zones: Vec<ZoneDefinition>,
    match_keys: Vec<String>,
    default_index: usize,
}

/// Serialized form of a catalog, validated on load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ZoneCatalogFile {
    zones: Vec<ZoneDefinition>,
    default: String,
}

static DEFAULT_CATALOG: LazyLock<ZoneCatalog> = LazyLock::new(ZoneCatalog::default);

impl Default for ZoneCatalog {
    fn default() -> Self {
        let zones = vec![
            ZoneDefinition {
                id: zones::URBANO_ID,
                name: zones::URBANO.to_string(),
            },
            ZoneDefinition {
                id: zones::RURAL_ID,
                name: zones::RURAL.to_string(),
            },
            ZoneDefinition {
                id: zones::SEMIURBANO_ID,
                name: zones::SEMIURBANO.to_string(),
            },
        ];
        let match_keys = zones.iter().map(|zone| title_case(&zone.name)).collect();

        Self {
            zones,
            match_keys,
            default_index: 2,
        }
    }
}

impl ZoneCatalog {
    /// Build a catalog, checking ids and names are unique and the default exists
    pub fn new(zones: Vec<ZoneDefinition>, default_name: &str) -> Result<Self> {
        if zones.is_empty() {
            return Err(SepomexError::configuration("zone catalog is empty"));
        }

        let mut ids = HashSet::new();
        let mut match_keys = Vec::with_capacity(zones.len());
        for zone in &zones {
            if zone.name.trim().is_empty() {
                return Err(SepomexError::configuration(format!(
                    "zone {} has an empty name",
                    zone.id
                )));
            }
            if !ids.insert(zone.id) {
                return Err(SepomexError::configuration(format!(
                    "duplicate zone id {}",
                    zone.id
                )));
            }
            let key = title_case(zone.name.trim());
            if match_keys.contains(&key) {
                return Err(SepomexError::configuration(format!(
                    "duplicate zone name '{}'",
                    zone.name
                )));
            }
            match_keys.push(key);
        }

        let default_index = zones
            .iter()
            .position(|zone| zone.name == default_name)
            .ok_or_else(|| {
                SepomexError::configuration(format!(
                    "default zone '{}' is not in the catalog",
                    default_name
                ))
            })?;

        Ok(Self {
            zones,
            match_keys,
            default_index,
        })
    }

    /// Zones in primary key order of declaration
    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    /// Category used for missing or unrecognized labels
    pub fn default_zone(&self) -> &ZoneDefinition {
        &self.zones[self.default_index]
    }

    /// Map a raw zone label onto its catalog category. Never fails.
    pub fn classify(&self, raw: Option<&str>) -> &ZoneDefinition {
        if is_absent(raw) {
            return self.default_zone();
        }

        let collapsed = raw
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let label = title_case(&collapsed);

        self.match_keys
            .iter()
            .position(|key| *key == label)
            .map_or_else(|| self.default_zone(), |index| &self.zones[index])
    }

    /// Canonical category name for a raw label
    pub fn normalize_zona(&self, raw: Option<&str>) -> &str {
        &self.classify(raw).name
    }

    /// Primary key of the category for a raw label
    pub fn zone_id(&self, raw: Option<&str>) -> i32 {
        self.classify(raw).id
    }
}

impl TryFrom<ZoneCatalogFile> for ZoneCatalog {
    type Error = SepomexError;

    fn try_from(file: ZoneCatalogFile) -> Result<Self> {
        Self::new(file.zones, &file.default)
    }
}

impl From<ZoneCatalog> for ZoneCatalogFile {
    fn from(catalog: ZoneCatalog) -> Self {
        let default = catalog.default_zone().name.clone();
        Self {
            zones: catalog.zones,
            default,
        }
    }
}

/// Normalize a zone label against the standard Urbano/Rural/Semiurbano taxonomy
pub fn normalize_zona(raw: Option<&str>) -> &'static str {
    DEFAULT_CATALOG.normalize_zona(raw)
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// Word boundaries are any non-alphabetic character, so "san-juan" becomes
/// "San-Juan".
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }

    result
}
