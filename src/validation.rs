//! Field and row validation.
//!
//! `Validator` offers three predicates (non-empty, length, pattern). None of
//! them fails: a failed check logs a warning with the row and field and is
//! tallied so the end-of-run report can say how many rows failed and why.
//! The postal-code row audit composes them over a whole source record.

use crate::config::NameLimits;
use crate::constants::columns;
use crate::error::Result;
use crate::models::{RawRecord, RecordSet};
use crate::normalize::is_absent;
use crate::schema::{CodePattern, SchemaContract};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Kind of a failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Empty,
    TooLong,
    PatternMismatch,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IssueKind::Empty => "empty",
            IssueKind::TooLong => "too long",
            IssueKind::PatternMismatch => "pattern mismatch",
        };
        f.write_str(text)
    }
}

/// Count of failed checks per field and kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueTally {
    counts: BTreeMap<String, BTreeMap<IssueKind, usize>>,
}

impl IssueTally {
    pub fn record(&mut self, field: &str, kind: IssueKind) {
        *self
            .counts
            .entry(field.to_string())
            .or_default()
            .entry(kind)
            .or_insert(0) += 1;
    }

    pub fn count(&self, field: &str, kind: IssueKind) -> usize {
        self.counts
            .get(field)
            .and_then(|kinds| kinds.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of failed checks
    pub fn total(&self) -> usize {
        self.counts.values().flat_map(BTreeMap::values).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Every (field, kind, count) entry in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, IssueKind, usize)> + '_ {
        self.counts.iter().flat_map(|(field, kinds)| {
            kinds
                .iter()
                .map(move |(kind, count)| (field.as_str(), *kind, *count))
        })
    }

    /// The `limit` most frequent issues, ties broken by field then kind
    pub fn most_frequent(&self, limit: usize) -> Vec<(&str, IssueKind, usize)> {
        let mut issues: Vec<(&str, IssueKind, usize)> = self.iter().collect();
        issues.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(b.0)).then(a.1.cmp(&b.1)));
        issues.truncate(limit);
        issues
    }
}

/// Predicate runner that logs and tallies every failed check
#[derive(Debug, Default)]
pub struct Validator {
    tally: IssueTally,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self) -> &IssueTally {
        &self.tally
    }

    pub fn into_tally(self) -> IssueTally {
        self.tally
    }

    /// Fails on absent values (None, blank, `nan`)
    pub fn not_empty(&mut self, value: Option<&str>, field: &str, row: usize) -> bool {
        if is_absent(value) {
            warn!("Row {}: required field '{}' is empty", row, field);
            self.tally.record(field, IssueKind::Empty);
            return false;
        }
        true
    }

    /// Fails when the value has more than `max` characters; None passes
    pub fn within_length(
        &mut self,
        value: Option<&str>,
        max: usize,
        field: &str,
        row: usize,
    ) -> bool {
        let Some(text) = value else {
            return true;
        };

        let length = text.chars().count();
        if length > max {
            warn!(
                "Row {}: field '{}' has {} characters, maximum is {}",
                row, field, length, max
            );
            self.tally.record(field, IssueKind::TooLong);
            return false;
        }
        true
    }

    /// Fails when the trimmed value does not fully match; None and blank pass
    pub fn matches_pattern(
        &mut self,
        value: Option<&str>,
        pattern: &CodePattern,
        field: &str,
        row: usize,
    ) -> bool {
        let Some(text) = value.map(str::trim).filter(|text| !text.is_empty()) else {
            return true;
        };

        if !pattern.is_match(text) {
            warn!(
                "Row {}: field '{}' value '{}' does not match {}",
                row, field, text, pattern
            );
            self.tally.record(field, IssueKind::PatternMismatch);
            return false;
        }
        true
    }

    /// Check one source record against the postal-code row contract.
    ///
    /// Every check runs so each issue of the row is reported; the row is
    /// valid only if all of them pass.
    pub fn audit_record(
        &mut self,
        record: &RawRecord,
        contract: &SchemaContract,
        limits: &NameLimits,
    ) -> Result<bool> {
        let row = record.row();
        let mut is_valid = true;

        for field in [
            columns::D_CODIGO,
            columns::D_ASENTA,
            columns::C_ESTADO,
            columns::C_TIPO_ASENTA,
            columns::D_ESTADO,
            columns::D_TIPO_ASENTA,
        ] {
            is_valid &= self.not_empty(record.field(field)?, field, row);
        }

        // Municipality and city are optional, but a code needs its name
        if !is_absent(record.field(columns::C_MNPIO)?) {
            is_valid &= self.not_empty(record.field(columns::D_MNPIO)?, columns::D_MNPIO, row);
        }
        if !is_absent(record.field(columns::C_CVE_CIUDAD)?) {
            is_valid &= self.not_empty(record.field(columns::D_CIUDAD)?, columns::D_CIUDAD, row);
        }

        let patterns = [
            (columns::D_CODIGO, &contract.codigo_postal),
            (columns::C_ESTADO, &contract.estado),
            (columns::C_MNPIO, &contract.municipio),
            (columns::C_CVE_CIUDAD, &contract.ciudad),
            (columns::C_TIPO_ASENTA, &contract.tipo_asentamiento),
            (columns::D_CP, &contract.codigo_postal),
            (columns::C_OFICINA, &contract.oficina),
            (columns::ID_ASENTA_CPCONS, &contract.asentamiento_consecutivo),
        ];
        for (field, pattern) in patterns {
            let value = record.field(field)?.filter(|value| !is_absent(Some(*value)));
            is_valid &= self.matches_pattern(value, pattern, field, row);
        }

        let lengths = [
            (columns::D_ASENTA, limits.nombre_asentamiento),
            (columns::D_ESTADO, limits.nombre),
            (columns::D_MNPIO, limits.nombre),
            (columns::D_CIUDAD, limits.nombre),
            (columns::D_TIPO_ASENTA, limits.nombre),
        ];
        for (field, max) in lengths {
            let collapsed = record
                .field(field)?
                .filter(|value| !is_absent(Some(*value)))
                .map(collapse_whitespace);
            is_valid &= self.within_length(collapsed.as_deref(), max, field, row);
        }

        Ok(is_valid)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outcome of auditing a whole source file
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub rows: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Rows that could not be read
    pub row_errors: usize,
    /// Recognized columns absent from the header
    pub missing_columns: Vec<String>,
    pub issues: IssueTally,
}

impl AuditReport {
    pub fn valid_rate(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            (self.valid as f64 / self.rows as f64) * 100.0
        }
    }
}

/// Audit every record of a source file against the postal-code row contract
pub fn audit_records(
    records: &RecordSet,
    contract: &SchemaContract,
    limits: &NameLimits,
) -> AuditReport {
    info!("Auditing {} records", records.len());

    let mut validator = Validator::new();
    let mut report = AuditReport {
        rows: records.len(),
        missing_columns: records
            .missing_columns(columns::RECOGNIZED)
            .into_iter()
            .map(str::to_string)
            .collect(),
        ..Default::default()
    };

    for record in records.records() {
        match validator.audit_record(record, contract, limits) {
            Ok(true) => report.valid += 1,
            Ok(false) => report.invalid += 1,
            Err(e) => {
                warn!("Row {} could not be audited: {}", record.row(), e);
                report.row_errors += 1;
                report.invalid += 1;
            }
        }
    }

    report.issues = validator.into_tally();
    debug!(
        "Audit complete: {} valid, {} invalid, {} issues",
        report.valid,
        report.invalid,
        report.issues.total()
    );

    report
}
