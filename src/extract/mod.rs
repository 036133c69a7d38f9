//! Entity extraction from the source records.
//!
//! Each of the six entities is extracted by an independent pass over the
//! shared, read-only record set. Every extractor declares the columns it
//! needs; when one is missing the entity degrades to an empty list with a
//! structural error in its statistics and the other entities carry on.

pub mod catalog;
pub mod codigos_postales;
pub mod zonas;

#[cfg(test)]
mod tests;

use crate::config::{CodeWidths, NameLimits, SepomexConfig};
use crate::constants::columns;
use crate::error::Result;
use crate::models::{EntityStats, RecordSet};
use crate::schema::{EntityKind, SchemaContract};
use crate::validation::IssueTally;
use crate::zone::ZoneCatalog;
use tracing::error;

/// Entities produced by one extractor together with its statistics
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub entities: Vec<T>,
    pub stats: EntityStats,
}

impl<T> Extraction<T> {
    fn empty(stats: EntityStats) -> Self {
        Self {
            entities: Vec::new(),
            stats,
        }
    }
}

/// Columns an entity cannot be extracted without
pub fn required_columns(entity: EntityKind) -> &'static [&'static str] {
    match entity {
        EntityKind::Estados => &[columns::C_ESTADO, columns::D_ESTADO],
        EntityKind::Municipios => &[columns::C_MNPIO, columns::C_ESTADO, columns::D_MNPIO],
        EntityKind::TiposAsentamiento => &[columns::C_TIPO_ASENTA, columns::D_TIPO_ASENTA],
        EntityKind::Zonas => &[],
        EntityKind::Ciudades => &[columns::C_CVE_CIUDAD, columns::C_ESTADO, columns::D_CIUDAD],
        EntityKind::CodigosPostales => &[
            columns::D_CODIGO,
            columns::D_ASENTA,
            columns::C_ESTADO,
            columns::C_TIPO_ASENTA,
        ],
    }
}

/// Extraction settings shared by all six extractors
#[derive(Debug, Clone)]
pub struct Extractor {
    contract: SchemaContract,
    limits: NameLimits,
    widths: CodeWidths,
    zones: ZoneCatalog,
}

impl Extractor {
    pub fn new(config: &SepomexConfig) -> Result<Self> {
        Ok(Self {
            contract: config.schema_contract()?,
            limits: config.limits,
            widths: config.code_widths,
            zones: config.zones.clone(),
        })
    }

    pub fn zones(&self) -> &ZoneCatalog {
        &self.zones
    }

    /// Record a structural error when `records` lacks a required column.
    ///
    /// Returns true when extraction can proceed.
    pub fn check_structure(
        &self,
        records: &RecordSet,
        entity: EntityKind,
        stats: &mut EntityStats,
    ) -> bool {
        let missing = records.missing_columns(required_columns(entity));
        if missing.is_empty() {
            return true;
        }

        let message = format!("missing required columns: {}", missing.join(", "));
        error!("Cannot extract {}: {}", entity, message);
        stats.structural_error = Some(message);
        false
    }
}

/// Fold validator issues into the entity's reason counts
fn merge_issues(stats: &mut EntityStats, issues: &IssueTally) {
    for (field, kind, count) in issues.iter() {
        *stats
            .reasons
            .entry(format!("{field}: {kind}"))
            .or_insert(0) += count;
    }
}
