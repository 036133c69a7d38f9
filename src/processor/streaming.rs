//! Batched postal-code processing.
//!
//! The postal-code table has one row per settlement (about 150k in the
//! national file), so it is extracted and rendered one batch at a time into
//! a staged script. Batch boundaries never change the script bytes.

use super::emit_entities;
use super::writer::ScriptFile;

use crate::constants::{PROGRESS_CHARS, PROGRESS_TEMPLATE};
use crate::extract::{Extraction, Extractor};
use crate::models::{CodigoPostal, EntityStats, RecordSet};
use crate::schema::EntityKind;
use crate::validation::Validator;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, error, info};

/// Extracts and writes the postal-code script batch by batch
#[derive(Debug)]
pub struct PostalCodeStreamer<'a> {
    extractor: &'a Extractor,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> PostalCodeStreamer<'a> {
    pub fn new(extractor: &'a Extractor, batch_size: usize, show_progress: bool) -> Self {
        Self {
            extractor,
            batch_size: batch_size.max(1),
            show_progress,
        }
    }

    /// Process every record; `None` for the directory is a dry run.
    ///
    /// Write failures are recorded in the statistics. Extraction carries on
    /// so the counts stay complete, but no partial script is left behind.
    pub fn run(&self, records: &RecordSet, output_dir: Option<&Path>) -> EntityStats {
        let entity = EntityKind::CodigosPostales;
        let mut stats = EntityStats::new(entity);

        if !self.extractor.check_structure(records, entity, &mut stats) {
            let placeholder = Extraction::<CodigoPostal> {
                entities: Vec::new(),
                stats,
            };
            return emit_entities(placeholder, output_dir);
        }

        let mut script = match output_dir.map(|dir| ScriptFile::create(dir, entity)) {
            Some(Ok(script)) => Some(script),
            Some(Err(e)) => {
                error!("Failed to stage the {} script: {}", entity, e);
                stats.write_error = Some(e.to_string());
                None
            }
            None => None,
        };

        let batch_count = records.len().div_ceil(self.batch_size);
        let pb = self.progress_bar(batch_count as u64);
        let mut validator = Validator::new();
        let mut emitted = 0;

        for (index, batch) in records.records().chunks(self.batch_size).enumerate() {
            let codigos = self
                .extractor
                .codigos_postales_batch(batch, &mut validator, &mut stats);
            emitted += codigos.len();
            debug!(
                "Batch {}/{}: {} of {} rows extracted",
                index + 1,
                batch_count,
                codigos.len(),
                batch.len()
            );

            let failed = match script.as_mut() {
                Some(script) => script.write_batch(&codigos).err(),
                None => None,
            };
            if let Some(e) = failed {
                error!("Failed to write the {} script: {}", entity, e);
                stats.write_error = Some(e.to_string());
                script = None;
            }

            pb.inc(1);
        }

        self.extractor.finish_codigos_postales(validator, &mut stats);
        pb.finish_with_message(format!("{} postal codes extracted", emitted));

        if let Some(script) = script {
            match script.commit() {
                Ok(path) => {
                    info!("Wrote {} {} to {}", emitted, entity, path.display());
                    stats.output = Some(path);
                }
                Err(e) => {
                    error!("Failed to write the {} script: {}", entity, e);
                    stats.write_error = Some(e.to_string());
                }
            }
        }

        stats.written = if stats.write_error.is_none() { emitted } else { 0 };
        stats
    }

    fn progress_bar(&self, batches: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(batches);
        pb.set_style(
            ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(PROGRESS_CHARS),
        );
        pb.set_message("codigos_postales");
        pb
    }
}
