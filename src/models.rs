//! Core data structures for SEPOMEX processing.
//!
//! Defines the raw record view over the source file, the six output
//! entities, per-entity processing statistics and the run report.

use crate::error::{Result, SepomexError};
use crate::header::ColumnMapping;
use crate::processor::writer::{SqlRow, SqlValue};
use crate::schema::EntityKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// One data row of the source, addressed by column name
#[derive(Debug, Clone)]
pub struct RawRecord {
    row: usize,
    columns: Arc<ColumnMapping>,
    values: Vec<Option<String>>,
}

impl RawRecord {
    pub fn new(row: usize, columns: Arc<ColumnMapping>, values: Vec<Option<String>>) -> Self {
        Self {
            row,
            columns,
            values,
        }
    }

    /// 1-based data row number
    pub fn row(&self) -> usize {
        self.row
    }

    /// Value of a column.
    ///
    /// A column missing from the header reads as `None`. A column the header
    /// declares but this record does not carry is a malformed row.
    pub fn field(&self, column: &str) -> Result<Option<&str>> {
        let Some(index) = self.columns.get_index(column) else {
            return Ok(None);
        };

        self.values
            .get(index)
            .map(|value| value.as_deref())
            .ok_or_else(|| {
                SepomexError::malformed_row(
                    self.row,
                    format!(
                        "column '{}' at position {} but the record has {} values",
                        column,
                        index + 1,
                        self.values.len()
                    ),
                )
            })
    }
}

/// Immutable, ordered set of source records sharing one header
#[derive(Debug, Clone)]
pub struct RecordSet {
    columns: Arc<ColumnMapping>,
    records: Vec<RawRecord>,
}

impl RecordSet {
    /// Build a record set from column names and row values; rows are numbered from 1
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let columns = Arc::new(ColumnMapping::new(columns));
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, values)| RawRecord::new(index + 1, Arc::clone(&columns), values))
            .collect();

        Self { columns, records }
    }

    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns from `required` absent from the header
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        self.columns.missing(required)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estado {
    pub codigo: String,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Municipio {
    pub codigo: String,
    pub estado: String,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipoAsentamiento {
    pub codigo: String,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zona {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciudad {
    pub codigo: String,
    pub estado: String,
    pub nombre: String,
}

/// Row of the postal-code fact table; the code alone is not unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodigoPostal {
    pub codigo: String,
    pub asentamiento: String,
    pub estado: String,
    pub municipio: Option<String>,
    pub ciudad: Option<String>,
    pub tipo_asentamiento: String,
    pub zona: i32,
}

impl SqlRow for Estado {
    fn sql_values(&self) -> Vec<SqlValue<'_>> {
        vec![SqlValue::Text(&self.codigo), SqlValue::Text(&self.nombre)]
    }
}

impl SqlRow for Municipio {
    fn sql_values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Text(&self.codigo),
            SqlValue::Text(&self.estado),
            SqlValue::Text(&self.nombre),
        ]
    }
}

impl SqlRow for TipoAsentamiento {
    fn sql_values(&self) -> Vec<SqlValue<'_>> {
        vec![SqlValue::Text(&self.codigo), SqlValue::Text(&self.nombre)]
    }
}

impl SqlRow for Zona {
    fn sql_values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Integer(i64::from(self.id)),
            SqlValue::Text(&self.nombre),
        ]
    }
}

impl SqlRow for Ciudad {
    fn sql_values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Text(&self.codigo),
            SqlValue::Text(&self.estado),
            SqlValue::Text(&self.nombre),
        ]
    }
}

impl SqlRow for CodigoPostal {
    fn sql_values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Text(&self.codigo),
            SqlValue::Text(&self.asentamiento),
            SqlValue::Text(&self.estado),
            SqlValue::optional_text(self.municipio.as_deref()),
            SqlValue::optional_text(self.ciudad.as_deref()),
            SqlValue::Text(&self.tipo_asentamiento),
            SqlValue::Integer(i64::from(self.zona)),
        ]
    }
}

/// Processing statistics for one output entity
#[derive(Debug, Clone, Serialize)]
pub struct EntityStats {
    pub entity: EntityKind,
    pub table: &'static str,
    /// Source rows examined
    pub scanned: usize,
    /// Rows rendered into the script
    pub written: usize,
    /// Rows whose key was already seen
    pub duplicates: usize,
    /// Rows without a code or name
    pub skipped: usize,
    /// Rows failing a required-field or pattern check
    pub rejected: usize,
    /// Rows that could not be read (e.g. ragged records)
    pub row_errors: usize,
    /// Rejection and skip reasons with their counts
    pub reasons: BTreeMap<String, usize>,
    /// Missing required columns, when the entity could not be extracted
    pub structural_error: Option<String>,
    /// Failure writing the script
    pub write_error: Option<String>,
    /// Script path, when one was written
    pub output: Option<PathBuf>,
}

impl EntityStats {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            table: entity.table().name,
            scanned: 0,
            written: 0,
            duplicates: 0,
            skipped: 0,
            rejected: 0,
            row_errors: 0,
            reasons: BTreeMap::new(),
            structural_error: None,
            write_error: None,
            output: None,
        }
    }

    /// Count one occurrence of a skip or rejection reason
    pub fn record_reason(&mut self, reason: impl Into<String>) {
        *self.reasons.entry(reason.into()).or_insert(0) += 1;
    }

    /// Record a row-level failure
    pub fn record_row_error(&mut self, error: &SepomexError) {
        self.row_errors += 1;
        let reason = match error {
            SepomexError::MalformedRow { .. } => "malformed row".to_string(),
            other => other.to_string(),
        };
        self.record_reason(reason);
    }

    /// Rows rejected for invalid data plus rows that could not be read
    pub fn error_count(&self) -> usize {
        self.rejected + self.row_errors
    }

    /// True when the entity produced a placeholder or failed to write
    pub fn is_degraded(&self) -> bool {
        self.structural_error.is_some() || self.write_error.is_some()
    }

    /// Share of scanned rows that were neither rejected nor unreadable, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.scanned == 0 {
            0.0
        } else {
            ((self.scanned - self.error_count().min(self.scanned)) as f64 / self.scanned as f64)
                * 100.0
        }
    }
}

/// End-of-run report covering every entity in dependency order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub input_rows: usize,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u128,
    pub entities: Vec<EntityStats>,
}

impl RunReport {
    /// Statistics of one entity
    pub fn entity(&self, kind: EntityKind) -> Option<&EntityStats> {
        self.entities.iter().find(|stats| stats.entity == kind)
    }

    pub fn total_written(&self) -> usize {
        self.entities.iter().map(|stats| stats.written).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.entities.iter().map(EntityStats::error_count).sum()
    }

    /// Entities whose script could not be written
    pub fn write_failures(&self) -> usize {
        self.entities
            .iter()
            .filter(|stats| stats.write_error.is_some())
            .count()
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
