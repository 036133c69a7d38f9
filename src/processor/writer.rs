//! SQL script writing module
//!
//! Renders entity rows into transactional INSERT scripts. A script always
//! opens with `BEGIN;` and closes with `COMMIT;`; rows are written as one
//! multi-row INSERT statement no matter how many batches they arrive in.
//! Script files are written to a temporary file in the output directory and
//! renamed into place on commit.

use crate::error::{Result, SepomexError};
use crate::schema::{EntityKind, TableSpec};

use std::fmt::Write as _;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A single SQL literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlValue<'a> {
    /// Single-quoted; the text must already be escaped
    Text(&'a str),
    Integer(i64),
    Null,
}

impl<'a> SqlValue<'a> {
    /// Text when present, NULL otherwise
    pub fn optional_text(value: Option<&'a str>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Text)
    }

    fn render(&self, out: &mut String) {
        match self {
            SqlValue::Text(text) => {
                out.push('\'');
                out.push_str(text);
                out.push('\'');
            }
            SqlValue::Integer(value) => {
                let _ = write!(out, "{value}");
            }
            SqlValue::Null => out.push_str("NULL"),
        }
    }
}

/// A value that renders as one VALUES tuple
pub trait SqlRow {
    fn sql_values(&self) -> Vec<SqlValue<'_>>;
}

/// Render a row as `('a', 'b', NULL, 1)`
pub fn render_tuple<R: SqlRow + ?Sized>(row: &R) -> String {
    let mut out = String::with_capacity(64);
    out.push('(');
    for (index, value) in row.sql_values().iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        value.render(&mut out);
    }
    out.push(')');
    out
}

/// Whether the INSERT header has been written yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertState {
    NoRowsYetWritten,
    HeaderWritten,
}

/// Streaming writer for one table's INSERT script
#[derive(Debug)]
pub struct SqlScriptWriter<W: Write> {
    table: &'static TableSpec,
    out: W,
    state: InsertState,
    rows_written: usize,
}

impl<W: Write> SqlScriptWriter<W> {
    /// Start a script, writing the opening `BEGIN;`
    pub fn begin(table: &'static TableSpec, mut out: W) -> io::Result<Self> {
        out.write_all(b"BEGIN;\n")?;
        Ok(Self {
            table,
            out,
            state: InsertState::NoRowsYetWritten,
            rows_written: 0,
        })
    }

    pub fn state(&self) -> InsertState {
        self.state
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append a batch of rows; an empty batch writes nothing
    pub fn write_batch<R: SqlRow>(&mut self, rows: &[R]) -> io::Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        match self.state {
            InsertState::NoRowsYetWritten => {
                writeln!(
                    self.out,
                    "INSERT INTO {} ({}) VALUES",
                    self.table.name,
                    self.table.columns.join(", ")
                )?;
                self.state = InsertState::HeaderWritten;
            }
            InsertState::HeaderWritten => self.out.write_all(b",\n")?,
        }

        let tuples: Vec<String> = rows.iter().map(render_tuple).collect();
        self.out.write_all(tuples.join(",\n").as_bytes())?;
        self.rows_written += rows.len();

        Ok(rows.len())
    }

    /// Close the statement (or note that no rows qualified) and write `COMMIT;`
    pub fn finish(mut self) -> io::Result<W> {
        match self.state {
            InsertState::NoRowsYetWritten => {
                writeln!(self.out, "-- No se encontraron {} válidos", self.table.label)?;
            }
            InsertState::HeaderWritten => self.out.write_all(b";\n")?,
        }
        self.out.write_all(b"COMMIT;\n")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Script file staged in a temporary file until committed
#[derive(Debug)]
pub struct ScriptFile {
    path: PathBuf,
    writer: SqlScriptWriter<BufWriter<NamedTempFile>>,
}

impl ScriptFile {
    /// Stage the script for `entity` inside `output_dir`
    pub fn create(output_dir: &Path, entity: EntityKind) -> Result<Self> {
        let path = output_dir.join(entity.file_name());
        let write_error = |source: io::Error| SepomexError::ScriptWrite {
            path: path.clone(),
            source,
        };

        let temp = NamedTempFile::new_in(output_dir).map_err(write_error)?;
        let writer =
            SqlScriptWriter::begin(entity.table(), BufWriter::new(temp)).map_err(write_error)?;

        debug!("Staging {}", path.display());
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.writer.rows_written()
    }

    pub fn write_batch<R: SqlRow>(&mut self, rows: &[R]) -> Result<usize> {
        self.writer
            .write_batch(rows)
            .map_err(|source| SepomexError::ScriptWrite {
                path: self.path.clone(),
                source,
            })
    }

    /// Finish the script and move it into place, replacing any previous run's file
    pub fn commit(self) -> Result<PathBuf> {
        let Self { path, writer } = self;
        let write_error = |source: io::Error| SepomexError::ScriptWrite {
            path: path.clone(),
            source,
        };

        if writer.state() == InsertState::NoRowsYetWritten {
            warn!("No valid {} found for {}", writer.table.label, path.display());
        }

        let buffered = writer.finish().map_err(write_error)?;
        let temp = buffered
            .into_inner()
            .map_err(|e| write_error(e.into_error()))?;
        temp.persist(&path).map_err(|e| write_error(e.error))?;

        Ok(path)
    }
}

/// Write a complete script for an already extracted entity list
pub fn write_script<R: SqlRow>(
    output_dir: &Path,
    entity: EntityKind,
    rows: &[R],
) -> Result<(PathBuf, usize)> {
    let mut script = ScriptFile::create(output_dir, entity)?;
    let written = script.write_batch(rows)?;
    let path = script.commit()?;
    Ok((path, written))
}
