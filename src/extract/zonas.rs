//! Zone catalog extraction.
//!
//! Zones do not come from the source rows: the script holds exactly the
//! configured catalog, names passed through the text cleaner.

use super::{Extraction, Extractor};
use crate::models::{EntityStats, Zona};
use crate::normalize::clean_text;
use crate::schema::EntityKind;
use tracing::{debug, info};

impl Extractor {
    pub fn zonas(&self) -> Extraction<Zona> {
        let mut stats = EntityStats::new(EntityKind::Zonas);
        let mut entities = Vec::with_capacity(self.zones.zones().len());

        for zone in self.zones.zones() {
            let nombre = clean_text(Some(&zone.name), self.limits.nombre);
            if nombre.is_empty() {
                debug!("Zone {} skipped, empty name", zone.id);
                stats.skipped += 1;
                stats.record_reason("empty nombre_zona");
                continue;
            }
            entities.push(Zona {
                id: zone.id,
                nombre,
            });
        }

        info!("Extracted {} zonas from the zone catalog", entities.len());
        Extraction { entities, stats }
    }
}
