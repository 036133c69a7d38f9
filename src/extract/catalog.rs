//! Catalog entity extraction (states, municipalities, settlement types, cities).
//!
//! All four catalogs follow the same row procedure:
//! 1. an absent code skips the row
//! 2. the code is formatted to its fixed width; an unparsable code rejects the row
//! 3. a key already extracted counts as a duplicate (first occurrence wins)
//! 4. a formatted code that fails its pattern rejects the row
//! 5. an empty cleaned name skips the row

use super::{Extraction, Extractor, merge_issues};
use crate::constants::columns;
use crate::error::Result;
use crate::models::{
    Ciudad, EntityStats, Estado, Municipio, RawRecord, RecordSet, TipoAsentamiento,
};
use crate::normalize::{clean_text, format_codigo, is_absent};
use crate::schema::{CodePattern, EntityKind};
use crate::validation::Validator;
use std::collections::HashSet;
use tracing::{debug, error, info};

/// A code column and the width and pattern it is formatted to
struct CodeField<'a> {
    column: &'static str,
    width: usize,
    pattern: &'a CodePattern,
}

/// Key columns and name column of one catalog
struct CatalogLayout<'a, const N: usize> {
    entity: EntityKind,
    codes: [CodeField<'a>; N],
    name_column: &'static str,
    name_limit: usize,
}

enum RowOutcome<T> {
    Extracted(String, T),
    Duplicate,
    Skipped(String),
    Rejected,
}

impl Extractor {
    /// States keyed by `c_estado`
    pub fn estados(&self, records: &RecordSet) -> Extraction<Estado> {
        let layout = CatalogLayout {
            entity: EntityKind::Estados,
            codes: [CodeField {
                column: columns::C_ESTADO,
                width: self.widths.estado,
                pattern: &self.contract.estado,
            }],
            name_column: columns::D_ESTADO,
            name_limit: self.limits.nombre,
        };

        self.extract_catalog(records, layout, |[codigo], nombre| Estado { codigo, nombre })
    }

    /// Municipalities keyed by (`c_mnpio`, `c_estado`)
    pub fn municipios(&self, records: &RecordSet) -> Extraction<Municipio> {
        let layout = CatalogLayout {
            entity: EntityKind::Municipios,
            codes: [
                CodeField {
                    column: columns::C_MNPIO,
                    width: self.widths.municipio,
                    pattern: &self.contract.municipio,
                },
                CodeField {
                    column: columns::C_ESTADO,
                    width: self.widths.estado,
                    pattern: &self.contract.estado,
                },
            ],
            name_column: columns::D_MNPIO,
            name_limit: self.limits.nombre,
        };

        self.extract_catalog(records, layout, |[codigo, estado], nombre| Municipio {
            codigo,
            estado,
            nombre,
        })
    }

    /// Settlement types keyed by `c_tipo_asenta`
    pub fn tipos_asentamiento(&self, records: &RecordSet) -> Extraction<TipoAsentamiento> {
        let layout = CatalogLayout {
            entity: EntityKind::TiposAsentamiento,
            codes: [CodeField {
                column: columns::C_TIPO_ASENTA,
                width: self.widths.tipo_asentamiento,
                pattern: &self.contract.tipo_asentamiento,
            }],
            name_column: columns::D_TIPO_ASENTA,
            name_limit: self.limits.nombre,
        };

        self.extract_catalog(records, layout, |[codigo], nombre| TipoAsentamiento {
            codigo,
            nombre,
        })
    }

    /// Cities keyed by (`c_cve_ciudad`, `c_estado`)
    pub fn ciudades(&self, records: &RecordSet) -> Extraction<Ciudad> {
        let layout = CatalogLayout {
            entity: EntityKind::Ciudades,
            codes: [
                CodeField {
                    column: columns::C_CVE_CIUDAD,
                    width: self.widths.ciudad,
                    pattern: &self.contract.ciudad,
                },
                CodeField {
                    column: columns::C_ESTADO,
                    width: self.widths.estado,
                    pattern: &self.contract.estado,
                },
            ],
            name_column: columns::D_CIUDAD,
            name_limit: self.limits.nombre,
        };

        self.extract_catalog(records, layout, |[codigo, estado], nombre| Ciudad {
            codigo,
            estado,
            nombre,
        })
    }

    fn extract_catalog<T, const N: usize>(
        &self,
        records: &RecordSet,
        layout: CatalogLayout<'_, N>,
        build: impl Fn([String; N], String) -> T,
    ) -> Extraction<T> {
        let entity = layout.entity;
        let mut stats = EntityStats::new(entity);
        if !self.check_structure(records, entity, &mut stats) {
            return Extraction::empty(stats);
        }

        let mut validator = Validator::new();
        let mut seen = HashSet::new();
        let mut entities = Vec::new();

        for record in records.records() {
            stats.scanned += 1;
            match catalog_row(record, &layout, &seen, &mut validator, &build) {
                Ok(RowOutcome::Extracted(key, item)) => {
                    seen.insert(key);
                    entities.push(item);
                }
                Ok(RowOutcome::Duplicate) => stats.duplicates += 1,
                Ok(RowOutcome::Skipped(reason)) => {
                    stats.skipped += 1;
                    stats.record_reason(reason);
                }
                Ok(RowOutcome::Rejected) => stats.rejected += 1,
                Err(e) => {
                    error!("Row {}: failed to extract {}: {}", record.row(), entity, e);
                    stats.record_row_error(&e);
                }
            }
        }

        merge_issues(&mut stats, validator.tally());
        info!(
            "Extracted {} {} from {} rows ({} duplicates, {} skipped, {} rejected)",
            entities.len(),
            entity,
            stats.scanned,
            stats.duplicates,
            stats.skipped,
            stats.rejected
        );

        Extraction { entities, stats }
    }
}

fn catalog_row<T, const N: usize>(
    record: &RawRecord,
    layout: &CatalogLayout<'_, N>,
    seen: &HashSet<String>,
    validator: &mut Validator,
    build: &impl Fn([String; N], String) -> T,
) -> Result<RowOutcome<T>> {
    let row = record.row();

    let mut raw: [Option<&str>; N] = [None; N];
    for (slot, field) in raw.iter_mut().zip(&layout.codes) {
        let value = record.field(field.column)?;
        if is_absent(value) {
            return Ok(RowOutcome::Skipped(format!("missing {}", field.column)));
        }
        *slot = value;
    }

    let mut codes: [String; N] = std::array::from_fn(|_| String::new());
    for ((code, value), field) in codes.iter_mut().zip(raw).zip(&layout.codes) {
        match format_codigo(value, field.width) {
            Some(formatted) => *code = formatted,
            None => {
                validator.matches_pattern(value, field.pattern, field.column, row);
                return Ok(RowOutcome::Rejected);
            }
        }
    }

    let key = codes.join("|");
    if seen.contains(&key) {
        return Ok(RowOutcome::Duplicate);
    }

    let mut valid = true;
    for (code, field) in codes.iter().zip(&layout.codes) {
        valid &= validator.matches_pattern(Some(code.as_str()), field.pattern, field.column, row);
    }
    if !valid {
        return Ok(RowOutcome::Rejected);
    }

    let nombre = clean_text(record.field(layout.name_column)?, layout.name_limit);
    if nombre.is_empty() {
        debug!(
            "Row {}: {} with key {} skipped, empty name",
            row, layout.entity, key
        );
        return Ok(RowOutcome::Skipped(format!("empty {}", layout.name_column)));
    }

    Ok(RowOutcome::Extracted(key, build(codes, nombre)))
}
