//! Extractor tests over in-memory record sets

pub mod codigos_postales_tests;

use crate::config::SepomexConfig;
use crate::extract::Extractor;
use crate::models::RecordSet;

/// Full SEPOMEX header in source order
pub const HEADER: &str = "d_codigo|d_asenta|d_tipo_asenta|D_mnpio|d_estado|d_ciudad|d_CP|c_estado|c_oficina|c_CP|c_tipo_asenta|c_mnpio|id_asenta_cpcons|d_zona|c_cve_ciudad";

/// Build a record set from pipe-delimited lines; empty fields read as absent
pub fn records_from(header: &str, lines: &[&str]) -> RecordSet {
    let columns = header.split('|').map(str::to_string).collect();
    let rows = lines
        .iter()
        .map(|line| {
            line.split('|')
                .map(|value| (!value.is_empty()).then(|| value.to_string()))
                .collect()
        })
        .collect();
    RecordSet::new(columns, rows)
}

pub fn sepomex_records(lines: &[&str]) -> RecordSet {
    records_from(HEADER, lines)
}

pub fn extractor() -> Extractor {
    Extractor::new(&SepomexConfig::default()).unwrap()
}
