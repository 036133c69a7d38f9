//! Postal-code extraction.
//!
//! Unlike the catalogs, a postal-code row reads the whole record. The postal
//! code, settlement name, state and settlement type are mandatory; every one
//! of them is checked so all problems of a row are logged. Municipality and
//! city foreign keys degrade to NULL and the zone always resolves.

use super::{Extraction, Extractor, merge_issues};
use crate::constants::columns;
use crate::error::Result;
use crate::models::{CodigoPostal, EntityStats, RawRecord, RecordSet};
use crate::normalize::{clean_text, format_codigo, is_absent};
use crate::schema::{CodePattern, EntityKind};
use crate::validation::Validator;
use tracing::{debug, error};

impl Extractor {
    /// Extract every postal-code row at once
    pub fn codigos_postales(&self, records: &RecordSet) -> Extraction<CodigoPostal> {
        let mut stats = EntityStats::new(EntityKind::CodigosPostales);
        if !self.check_structure(records, EntityKind::CodigosPostales, &mut stats) {
            return Extraction::empty(stats);
        }

        let mut validator = Validator::new();
        let entities = self.codigos_postales_batch(records.records(), &mut validator, &mut stats);
        merge_issues(&mut stats, validator.tally());

        Extraction { entities, stats }
    }

    /// Extract one batch of rows, updating `stats` as rows are examined.
    ///
    /// Batching only groups output; the same rows give the same entities
    /// however they are split.
    pub fn codigos_postales_batch(
        &self,
        batch: &[RawRecord],
        validator: &mut Validator,
        stats: &mut EntityStats,
    ) -> Vec<CodigoPostal> {
        let mut entities = Vec::with_capacity(batch.len());

        for record in batch {
            stats.scanned += 1;
            match self.codigo_postal(record, validator) {
                Ok(Some(codigo_postal)) => entities.push(codigo_postal),
                Ok(None) => stats.rejected += 1,
                Err(e) => {
                    error!("Row {}: failed to extract postal code: {}", record.row(), e);
                    stats.record_row_error(&e);
                }
            }
        }

        entities
    }

    /// Fold the batch validator's issues into the final statistics
    pub fn finish_codigos_postales(&self, validator: Validator, stats: &mut EntityStats) {
        merge_issues(stats, &validator.into_tally());
    }

    fn codigo_postal(
        &self,
        record: &RawRecord,
        validator: &mut Validator,
    ) -> Result<Option<CodigoPostal>> {
        let row = record.row();

        let codigo = required_code(
            validator,
            record.field(columns::D_CODIGO)?,
            self.widths.codigo_postal,
            &self.contract.codigo_postal,
            columns::D_CODIGO,
            row,
        );
        let estado = required_code(
            validator,
            record.field(columns::C_ESTADO)?,
            self.widths.estado,
            &self.contract.estado,
            columns::C_ESTADO,
            row,
        );
        let tipo_asentamiento = required_code(
            validator,
            record.field(columns::C_TIPO_ASENTA)?,
            self.widths.tipo_asentamiento,
            &self.contract.tipo_asentamiento,
            columns::C_TIPO_ASENTA,
            row,
        );

        let asentamiento = clean_text(
            record.field(columns::D_ASENTA)?,
            self.limits.nombre_asentamiento,
        );
        let has_name = validator.not_empty(Some(asentamiento.as_str()), columns::D_ASENTA, row);

        let municipio = optional_code(
            validator,
            record.field(columns::C_MNPIO)?,
            self.widths.municipio,
            &self.contract.municipio,
            columns::C_MNPIO,
            row,
        );
        let ciudad = optional_code(
            validator,
            record.field(columns::C_CVE_CIUDAD)?,
            self.widths.ciudad,
            &self.contract.ciudad,
            columns::C_CVE_CIUDAD,
            row,
        );
        let zona = self.zones.zone_id(record.field(columns::D_ZONA)?);

        let (Some(codigo), Some(estado), Some(tipo_asentamiento), true) =
            (codigo, estado, tipo_asentamiento, has_name)
        else {
            return Ok(None);
        };

        Ok(Some(CodigoPostal {
            codigo,
            asentamiento,
            estado,
            municipio,
            ciudad,
            tipo_asentamiento,
            zona,
        }))
    }
}

/// Format a mandatory code, logging and tallying an absent or invalid value
fn required_code(
    validator: &mut Validator,
    raw: Option<&str>,
    width: usize,
    pattern: &CodePattern,
    field: &str,
    row: usize,
) -> Option<String> {
    if !validator.not_empty(raw, field, row) {
        return None;
    }
    checked_code(validator, raw, width, pattern, field, row)
}

/// Format an optional foreign key; absent or invalid values become NULL
fn optional_code(
    validator: &mut Validator,
    raw: Option<&str>,
    width: usize,
    pattern: &CodePattern,
    field: &str,
    row: usize,
) -> Option<String> {
    if is_absent(raw) {
        return None;
    }
    let code = checked_code(validator, raw, width, pattern, field, row);
    if code.is_none() {
        debug!("Row {}: {} set to NULL", row, field);
    }
    code
}

fn checked_code(
    validator: &mut Validator,
    raw: Option<&str>,
    width: usize,
    pattern: &CodePattern,
    field: &str,
    row: usize,
) -> Option<String> {
    match format_codigo(raw, width) {
        Some(code) => validator
            .matches_pattern(Some(code.as_str()), pattern, field, row)
            .then_some(code),
        None => {
            validator.matches_pattern(raw, pattern, field, row);
            None
        }
    }
}
