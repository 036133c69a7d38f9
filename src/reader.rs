//! Source file reading.
//!
//! SEPOMEX publishes the catalog as pipe-separated text in a legacy code
//! page with a disclaimer line above the header. Reading happens in three
//! steps: decode the bytes, locate the header, parse the data rows with
//! polars as plain strings. Any failure here is fatal to the run.

use crate::config::SepomexConfig;
use crate::constants::columns;
use crate::error::{Result, SepomexError};
use crate::header::{ColumnMapping, HeaderLocation, locate_header};
use crate::models::RecordSet;
use crate::normalize::drop_invalid_utf8;
use encoding_rs::{Encoding, UTF_8};
use polars::prelude::{CsvParseOptions, CsvReadOptions, DataType, Schema, SerReader};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decoded source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSource {
    pub text: String,
    /// Name of the encoding actually used (a byte-order mark wins over the label)
    pub encoding: &'static str,
    /// True when undecodable bytes were dropped or replaced
    pub lossy: bool,
}

/// Read, decode and parse a SEPOMEX source file
pub fn read_source(path: &Path, config: &SepomexConfig) -> Result<RecordSet> {
    if !path.is_file() {
        return Err(SepomexError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    info!("Reading SEPOMEX source: {}", path.display());
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(SepomexError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }

    let decoded = decode_source(&bytes, config.source_encoding()?);
    debug!(
        "Decoded {} bytes as {}{}",
        bytes.len(),
        decoded.encoding,
        if decoded.lossy { " (lossy)" } else { "" }
    );

    match parse_source(&decoded.text, config.separator_byte()?, path) {
        Err(SepomexError::InvalidFormat { .. }) if decoded.lossy => Err(SepomexError::Decode {
            path: path.to_path_buf(),
            encoding: decoded.encoding.to_string(),
        }),
        result => result,
    }
}

/// Decode source bytes.
///
/// A byte-order mark overrides the configured encoding and is stripped.
/// Invalid UTF-8 sequences are dropped; other encodings fall back to the
/// replacement character for bytes they cannot map.
pub fn decode_source(bytes: &[u8], encoding: &'static Encoding) -> DecodedSource {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
    let bytes = &bytes[bom_length..];

    if encoding == UTF_8 {
        let text = drop_invalid_utf8(bytes);
        let lossy = text.len() != bytes.len();
        if lossy {
            warn!("Dropped invalid UTF-8 sequences from the source");
        }
        return DecodedSource {
            text: text.into_owned(),
            encoding: encoding.name(),
            lossy,
        };
    }

    if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        return DecodedSource {
            text: text.into_owned(),
            encoding: encoding.name(),
            lossy: false,
        };
    }

    warn!(
        "Source contains bytes that are not valid {}; they were replaced",
        encoding.name()
    );
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    DecodedSource {
        text: text.into_owned(),
        encoding: encoding.name(),
        lossy: true,
    }
}

/// Locate the header in decoded text and parse every data row below it
pub fn parse_source(text: &str, separator: u8, path: &Path) -> Result<RecordSet> {
    let location =
        locate_header(text, char::from(separator)).ok_or_else(|| SepomexError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!(
                "no header line with a '{}' column found",
                columns::D_CODIGO
            ),
        })?;

    if location.skipped_lines() > 0 {
        debug!("Skipped {} preamble lines", location.skipped_lines());
    }

    let records = parse_records(text, &location, separator, path)?;
    log_missing_columns(records.columns());
    info!(
        "Read {} records with {} columns",
        records.len(),
        records.columns().len()
    );

    Ok(records)
}

fn parse_records(
    text: &str,
    location: &HeaderLocation,
    separator: u8,
    path: &Path,
) -> Result<RecordSet> {
    let width = location.columns.len();
    let body = text[location.byte_offset..].replace("\r\n", "\n");
    let data: Vec<&str> = body
        .split('\n')
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if data.is_empty() {
        warn!("Source has a header but no data rows");
        return Ok(RecordSet::new(location.columns.clone(), Vec::new()));
    }

    // Positional names keep polars independent of duplicate header names
    let mut schema = Schema::with_capacity(width);
    for index in 0..width {
        schema.with_column(format!("column_{}", index + 1).into(), DataType::String);
    }

    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(Arc::new(schema)))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(None)
                .with_truncate_ragged_lines(true),
        )
        .into_reader_with_file_handle(Cursor::new(data.join("\n").into_bytes()))
        .finish()?;

    if df.height() != data.len() {
        return Err(SepomexError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!(
                "parsed {} rows from {} data lines",
                df.height(),
                data.len()
            ),
        });
    }

    // Values beyond a row's own field count stay missing so the row reads as malformed
    let field_counts: Vec<usize> = data
        .iter()
        .map(|line| line.bytes().filter(|byte| *byte == separator).count() + 1)
        .collect();
    let short_rows = field_counts.iter().filter(|count| **count < width).count();
    if short_rows > 0 {
        warn!(
            "{} rows have fewer than the {} header fields",
            short_rows, width
        );
    }

    let mut rows: Vec<Vec<Option<String>>> = field_counts
        .iter()
        .map(|count| Vec::with_capacity((*count).min(width)))
        .collect();
    for column in df.get_columns() {
        let column = column.cast(&DataType::String)?;
        for ((row, count), value) in rows.iter_mut().zip(&field_counts).zip(column.str()?) {
            if row.len() < *count {
                row.push(value.map(str::to_string));
            }
        }
    }

    Ok(RecordSet::new(location.columns.clone(), rows))
}

fn log_missing_columns(mapping: &ColumnMapping) {
    for column in mapping.missing(columns::RECOGNIZED) {
        if columns::OPTIONAL.contains(&column) {
            debug!("Optional column '{}' not present in the source", column);
        } else {
            warn!("Column '{}' not present in the source", column);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PREAMBLE: &str = "El Catálogo Nacional de Códigos Postales, es elaborado por Correos de México";

    fn write_source(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_decode_windows_1252() {
        let decoded = decode_source(b"San \xc1ngel|Ca\xf1ada", WINDOWS_1252);
        assert_eq!(decoded.text, "San Ángel|Cañada");
        assert_eq!(decoded.encoding, "windows-1252");
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_decode_bom_overrides_label() {
        let decoded = decode_source("\u{feff}d_codigo|Peñón".as_bytes(), WINDOWS_1252);
        assert_eq!(decoded.text, "d_codigo|Peñón");
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn test_decode_utf8_drops_invalid_bytes() {
        let decoded = decode_source(b"Le\xffon", UTF_8);
        assert_eq!(decoded.text, "Leon");
        assert!(decoded.lossy);
    }

    #[test]
    fn test_parse_skips_preamble() {
        let text = format!(
            "{PREAMBLE}\r\nd_codigo|d_asenta|c_estado\r\n01000|San Ángel|09\r\n01010|Los Alpes|09\r\n"
        );
        let records = parse_source(&text, b'|', Path::new("CPdescarga.txt")).unwrap();

        assert_eq!(records.len(), 2);
        let first = &records.records()[0];
        assert_eq!(first.row(), 1);
        assert_eq!(first.field("d_codigo").unwrap(), Some("01000"));
        assert_eq!(first.field("d_asenta").unwrap(), Some("San Ángel"));
        assert_eq!(records.records()[1].field("c_estado").unwrap(), Some("09"));
    }

    #[test]
    fn test_parse_keeps_codes_as_text() {
        let text = "d_codigo|c_estado|c_mnpio\n01000|09|010\n";
        let records = parse_source(text, b'|', Path::new("source.txt")).unwrap();

        let record = &records.records()[0];
        assert_eq!(record.field("c_estado").unwrap(), Some("09"));
        assert_eq!(record.field("c_mnpio").unwrap(), Some("010"));
    }

    #[test]
    fn test_parse_keeps_stray_quotes() {
        let text = "d_codigo|d_asenta\n01000|El \"Paraíso\n";
        let records = parse_source(text, b'|', Path::new("source.txt")).unwrap();

        assert_eq!(
            records.records()[0].field("d_asenta").unwrap(),
            Some("El \"Paraíso")
        );
    }

    #[test]
    fn test_short_row_reads_as_malformed() {
        let text = "d_codigo|d_asenta|c_estado\n01000|San Ángel|09\n01010\n";
        let records = parse_source(text, b'|', Path::new("source.txt")).unwrap();

        let short = &records.records()[1];
        assert_eq!(short.field("d_codigo").unwrap(), Some("01010"));
        assert!(matches!(
            short.field("c_estado"),
            Err(SepomexError::MalformedRow { row: 2, .. })
        ));
    }

    #[test]
    fn test_header_only_source() {
        let records = parse_source("d_codigo|d_asenta\n", b'|', Path::new("source.txt")).unwrap();
        assert!(records.is_empty());
        assert_eq!(records.columns().len(), 2);
    }

    #[test]
    fn test_missing_header_is_invalid() {
        let result = parse_source("a|b\n1|2\n", b'|', Path::new("source.txt"));
        assert!(matches!(result, Err(SepomexError::InvalidFormat { .. })));
    }

    #[test]
    fn test_read_windows_1252_file() {
        let mut bytes = b"Aviso legal de Correos de M\xe9xico\n".to_vec();
        bytes.extend_from_slice(b"d_codigo|d_asenta|d_estado|c_estado\n");
        bytes.extend_from_slice(b"01000|San \xc1ngel|Ciudad de M\xe9xico|09\n");
        let file = write_source(&bytes);

        let records = read_source(file.path(), &SepomexConfig::default()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records.records()[0].field("d_estado").unwrap(),
            Some("Ciudad de México")
        );
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_source(
            Path::new("/nonexistent/CPdescarga.txt"),
            &SepomexConfig::default(),
        );
        assert!(matches!(result, Err(SepomexError::InputNotFound { .. })));
    }

    #[test]
    fn test_read_empty_file() {
        let file = write_source(b"");
        let result = read_source(file.path(), &SepomexConfig::default());
        assert!(matches!(result, Err(SepomexError::InvalidFormat { .. })));
    }

    #[test]
    fn test_lossy_source_without_header_is_decode_error() {
        let file = write_source(b"\xc3\x28\xff|\xfe\n1|2\n");
        let config = SepomexConfig::default().with_encoding("utf-8");
        let result = read_source(file.path(), &config);
        assert!(matches!(result, Err(SepomexError::Decode { .. })));
    }
}
