//! SEPOMEX header detection and column mapping.
//!
//! The published extract opens with a disclaimer line before the real
//! header. The header is the first line, among the first few, that names
//! the postal-code column; everything above it is skipped.

use crate::constants::{HEADER_MARKER_COLUMN, MAX_PREAMBLE_LINES};
use std::collections::HashMap;
use tracing::debug;

/// Position and columns of the header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    /// 0-based line index of the header
    pub line_index: usize,
    /// Byte offset where the header line starts
    pub byte_offset: usize,
    /// Trimmed column names in source order
    pub columns: Vec<String>,
}

impl HeaderLocation {
    /// Number of preamble lines skipped before the header
    pub fn skipped_lines(&self) -> usize {
        self.line_index
    }
}

/// Locate the header line within the first `MAX_PREAMBLE_LINES + 1` lines
pub fn locate_header(text: &str, separator: char) -> Option<HeaderLocation> {
    let mut byte_offset = 0;

    for (line_index, line) in text.split_inclusive('\n').enumerate() {
        if line_index > MAX_PREAMBLE_LINES {
            break;
        }

        let columns = split_header_line(line, separator);
        if columns.iter().any(|column| column == HEADER_MARKER_COLUMN) {
            debug!(
                "Header found at line {} with {} columns",
                line_index + 1,
                columns.len()
            );
            return Some(HeaderLocation {
                line_index,
                byte_offset,
                columns,
            });
        }

        byte_offset += line.len();
    }

    None
}

fn split_header_line(line: &str, separator: char) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(separator)
        .map(|column| column.trim().trim_start_matches('\u{feff}').to_string())
        .collect()
}

/// Column name to position mapping shared by every record of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Column name to index mapping
    pub name_to_index: HashMap<String, usize>,

    /// Column names in source order
    pub columns: Vec<String>,
}

impl ColumnMapping {
    /// Build the mapping; a repeated column name resolves to its first position
    pub fn new(columns: Vec<String>) -> Self {
        let mut name_to_index = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            name_to_index.entry(column.clone()).or_insert(index);
        }

        Self {
            name_to_index,
            columns,
        }
    }

    /// Get the index for a given column name
    pub fn get_index(&self, column_name: &str) -> Option<usize> {
        self.name_to_index.get(column_name).copied()
    }

    /// Check if a column exists in the mapping
    pub fn has_column(&self, column_name: &str) -> bool {
        self.name_to_index.contains_key(column_name)
    }

    /// Columns from `required` that are not in the mapping
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|column| !self.has_column(column))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "d_codigo|d_asenta|d_tipo_asenta|D_mnpio|d_estado|d_ciudad|d_CP|c_estado|c_oficina|c_CP|c_tipo_asenta|c_mnpio|id_asenta_cpcons|d_zona|c_cve_ciudad";

    #[test]
    fn test_locate_header_after_disclaimer() {
        let text = format!(
            "El Catálogo Nacional de Códigos Postales, es elaborado por Correos de México\r\n{}\r\n01000|San Ángel|Colonia\r\n",
            HEADER
        );

        let location = locate_header(&text, '|').unwrap();
        assert_eq!(location.line_index, 1);
        assert_eq!(location.skipped_lines(), 1);
        assert_eq!(location.columns.len(), 15);
        assert_eq!(location.columns[0], "d_codigo");
        assert_eq!(location.columns[14], "c_cve_ciudad");
        assert!(text[location.byte_offset..].starts_with("d_codigo|"));
    }

    #[test]
    fn test_locate_header_on_first_line() {
        let text = format!("{}\n85000|Centro\n", HEADER);
        let location = locate_header(&text, '|').unwrap();
        assert_eq!(location.line_index, 0);
        assert_eq!(location.byte_offset, 0);
    }

    #[test]
    fn test_header_with_bom() {
        let text = "\u{feff}d_codigo|d_asenta\n85000|Centro\n";
        let location = locate_header(text, '|').unwrap();
        assert_eq!(location.columns, vec!["d_codigo", "d_asenta"]);
    }

    #[test]
    fn test_missing_header() {
        assert!(locate_header("", '|').is_none());
        assert!(locate_header("a|b|c\n1|2|3\n", '|').is_none());

        let mut text = "disclaimer\n".repeat(MAX_PREAMBLE_LINES + 1);
        text.push_str(HEADER);
        assert!(locate_header(&text, '|').is_none());
    }

    #[test]
    fn test_column_mapping() {
        let mapping = ColumnMapping::new(vec![
            "d_codigo".to_string(),
            "d_asenta".to_string(),
            "d_codigo".to_string(),
        ]);

        assert_eq!(mapping.get_index("d_codigo"), Some(0));
        assert_eq!(mapping.get_index("d_asenta"), Some(1));
        assert_eq!(mapping.get_index("d_zona"), None);
        assert!(mapping.has_column("d_asenta"));
        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.missing(&["d_codigo", "c_estado", "d_zona"]),
            vec!["c_estado", "d_zona"]
        );
    }
}
