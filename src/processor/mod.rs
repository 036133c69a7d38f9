//! Main processing engine.
//!
//! Reads the source once, runs the six extractors over the shared record
//! set and writes one script per entity in foreign-key order. The postal
//! code table is extracted and written in batches by the streaming module;
//! the catalogs are small and written in one go.

pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::streaming::PostalCodeStreamer;
use self::writer::{SqlRow, write_script};

use crate::config::SepomexConfig;
use crate::error::{Result, SepomexError};
use crate::extract::{Extraction, Extractor};
use crate::models::{EntityStats, RecordSet, RunReport};
use crate::reader::read_source;
use crate::schema::EntityKind;

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// SEPOMEX to SQL conversion pipeline
#[derive(Debug)]
pub struct Pipeline {
    config: SepomexConfig,
    output_dir: PathBuf,
    dry_run: bool,
    extractor: Extractor,
}

impl Pipeline {
    /// Create a pipeline writing into `output_dir`; the configuration is validated here
    pub fn new(config: SepomexConfig, output_dir: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let extractor = Extractor::new(&config)?;

        Ok(Self {
            config,
            output_dir: output_dir.into(),
            dry_run: false,
            extractor,
        })
    }

    /// Extract and report without writing any script
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &SepomexConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Convert a source file into the six insert scripts
    pub fn run(&self, input: &Path) -> Result<RunReport> {
        let start_time = Instant::now();
        let records = read_source(input, &self.config)?;

        let mut report = self.process(&records, start_time)?;
        report.input = Some(input.to_path_buf());
        Ok(report)
    }

    /// Convert an already loaded record set
    pub fn run_on_records(&self, records: &RecordSet) -> Result<RunReport> {
        self.process(records, Instant::now())
    }

    fn process(&self, records: &RecordSet, start_time: Instant) -> Result<RunReport> {
        if !self.dry_run {
            fs::create_dir_all(&self.output_dir).map_err(|source| SepomexError::ScriptWrite {
                path: self.output_dir.clone(),
                source,
            })?;
        }
        let output_dir = (!self.dry_run).then_some(self.output_dir.as_path());

        info!(
            "Generating {} scripts from {} records",
            EntityKind::ALL.len(),
            records.len()
        );

        let mut entities = Vec::with_capacity(EntityKind::ALL.len());
        for entity in EntityKind::ALL {
            let stats = match entity {
                EntityKind::Estados => emit_entities(self.extractor.estados(records), output_dir),
                EntityKind::Municipios => {
                    emit_entities(self.extractor.municipios(records), output_dir)
                }
                EntityKind::TiposAsentamiento => {
                    emit_entities(self.extractor.tipos_asentamiento(records), output_dir)
                }
                EntityKind::Zonas => emit_entities(self.extractor.zonas(), output_dir),
                EntityKind::Ciudades => emit_entities(self.extractor.ciudades(records), output_dir),
                EntityKind::CodigosPostales => PostalCodeStreamer::new(
                    &self.extractor,
                    self.config.batch_size,
                    self.config.show_progress,
                )
                .run(records, output_dir),
            };
            entities.push(stats);
        }

        let report = RunReport {
            input: None,
            output_dir: self.output_dir.clone(),
            dry_run: self.dry_run,
            input_rows: records.len(),
            generated_at: Utc::now(),
            elapsed_ms: start_time.elapsed().as_millis(),
            entities,
        };

        info!(
            "Run complete: {} rows written, {} errors, {} write failures in {}ms",
            report.total_written(),
            report.total_errors(),
            report.write_failures(),
            report.elapsed_ms
        );

        Ok(report)
    }
}

/// Write an extracted entity list as one script.
///
/// `None` for the directory means a dry run: the rows are counted as if
/// written. A write failure is recorded in the returned statistics.
fn emit_entities<R: SqlRow>(extraction: Extraction<R>, output_dir: Option<&Path>) -> EntityStats {
    let Extraction {
        entities,
        mut stats,
    } = extraction;
    let entity = stats.entity;

    let Some(output_dir) = output_dir else {
        stats.written = entities.len();
        return stats;
    };

    match write_script(output_dir, entity, &entities) {
        Ok((path, written)) => {
            info!("Wrote {} {} to {}", written, entity, path.display());
            stats.written = written;
            stats.output = Some(path);
        }
        Err(e) => {
            error!("Failed to write the {} script: {}", entity, e);
            stats.write_error = Some(e.to_string());
        }
    }

    stats
}
