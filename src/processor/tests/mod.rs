//! Integration tests for the processor module
//!
//! Runs the complete pipeline over small SEPOMEX extracts written to
//! temporary directories.

pub mod error_handling;

use encoding_rs::WINDOWS_1252;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "d_codigo|d_asenta|d_tipo_asenta|D_mnpio|d_estado|d_ciudad|d_CP|c_estado|c_oficina|c_CP|c_tipo_asenta|c_mnpio|id_asenta_cpcons|d_zona|c_cve_ciudad";

pub const PREAMBLE: &str = "El Catálogo Nacional de Códigos Postales, es elaborado por Correos de México y se proporciona en forma gratuita para uso particular";

/// Source rows covering the common cases: a complete row, padded codes with
/// absent municipality and city, a row without postal code and an unknown zone
pub const ROWS: [&str; 4] = [
    "83000|Hermosillo Centro|Colonia|Hermosillo|Sonora|Hermosillo|83001|26|83001||09|030|0001|Urbano|01",
    "85000.0|Centro|Colonia||Sonora||85001|5|85001||09||0001|urbano|",
    "|Sin Código|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0002|Urbano|",
    "83010|La Manga|Pueblo|Hermosillo|Sonora|Hermosillo|83001|26|83001||28|030|0003|Pueblo|01",
];

/// Write a windows-1252 source with the disclaimer preamble and CRLF line ends
pub fn write_source(dir: &Path, header: &str, rows: &[&str]) -> PathBuf {
    let mut text = format!("{PREAMBLE}\r\n{header}\r\n");
    for row in rows {
        text.push_str(row);
        text.push_str("\r\n");
    }
    let (bytes, _, had_errors) = WINDOWS_1252.encode(&text);
    assert!(!had_errors);

    let path = dir.join("CPdescarga.txt");
    fs::write(&path, bytes).unwrap();
    path
}

pub fn read_script(dir: &Path, file_name: &str) -> String {
    fs::read_to_string(dir.join(file_name)).unwrap()
}
