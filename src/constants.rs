//! Application constants for the SEPOMEX SQL generator
//!
//! This module contains the source column names, output table layouts,
//! default limits and file naming used throughout the generator.

// =============================================================================
// Source File Format
// =============================================================================

/// Default encoding of the published SEPOMEX extract
pub const DEFAULT_ENCODING: &str = "windows-1252";

/// Field separator used by the SEPOMEX extract
pub const DEFAULT_SEPARATOR: char = '|';

/// Column whose presence identifies the header line
pub const HEADER_MARKER_COLUMN: &str = columns::D_CODIGO;

/// Maximum number of preamble lines before the header (the extract starts with a disclaimer)
pub const MAX_PREAMBLE_LINES: usize = 10;

/// Column names of the SEPOMEX extract
pub mod columns {
    /// Postal code
    pub const D_CODIGO: &str = "d_codigo";
    /// Settlement name
    pub const D_ASENTA: &str = "d_asenta";
    /// Settlement type name
    pub const D_TIPO_ASENTA: &str = "d_tipo_asenta";
    /// Municipality name (capitalised in the published file)
    pub const D_MNPIO: &str = "D_mnpio";
    /// State name
    pub const D_ESTADO: &str = "d_estado";
    /// City name
    pub const D_CIUDAD: &str = "d_ciudad";
    /// Administrative postal code of the delivering office
    pub const D_CP: &str = "d_CP";
    /// State code
    pub const C_ESTADO: &str = "c_estado";
    /// Delivering office code
    pub const C_OFICINA: &str = "c_oficina";
    /// Postal code key (empty in published extracts)
    pub const C_CP: &str = "c_CP";
    /// Settlement type code
    pub const C_TIPO_ASENTA: &str = "c_tipo_asenta";
    /// Municipality code
    pub const C_MNPIO: &str = "c_mnpio";
    /// Consecutive settlement id within the municipality
    pub const ID_ASENTA_CPCONS: &str = "id_asenta_cpcons";
    /// Zone label (Urbano, Rural, Semiurbano)
    pub const D_ZONA: &str = "d_zona";
    /// City code
    pub const C_CVE_CIUDAD: &str = "c_cve_ciudad";

    /// Every column the generator recognizes
    pub const RECOGNIZED: &[&str] = &[
        D_CODIGO,
        D_ASENTA,
        D_TIPO_ASENTA,
        D_MNPIO,
        D_ESTADO,
        D_CIUDAD,
        D_CP,
        C_ESTADO,
        C_OFICINA,
        C_CP,
        C_TIPO_ASENTA,
        C_MNPIO,
        ID_ASENTA_CPCONS,
        D_ZONA,
        C_CVE_CIUDAD,
    ];

    /// Recognized columns whose absence is expected and not worth a warning
    pub const OPTIONAL: &[&str] = &[D_ZONA, D_CP, C_OFICINA, C_CP, ID_ASENTA_CPCONS];
}

// =============================================================================
// Validation Limits
// =============================================================================

/// Maximum length of catalog names (states, municipalities, cities, types, zones)
pub const MAX_LEN_NOMBRE: usize = 50;

/// Maximum length of settlement names
pub const MAX_LEN_NOMBRE_ASENTAMIENTO: usize = 100;

/// Code widths of the target schema
pub mod code_widths {
    pub const CODIGO_POSTAL: usize = 5;
    pub const ESTADO: usize = 2;
    pub const MUNICIPIO: usize = 3;
    pub const CIUDAD: usize = 2;
    pub const TIPO_ASENTAMIENTO: usize = 2;
    pub const OFICINA: usize = 5;
    pub const ASENTAMIENTO_CONSECUTIVO: usize = 4;
}

// =============================================================================
// Processing
// =============================================================================

/// Rows of the postal-code table rendered per write
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default directory for generated scripts
pub const DEFAULT_OUTPUT_DIR: &str = "generated_sql";

/// Zone taxonomy of the target schema
pub mod zones {
    pub const URBANO: &str = "Urbano";
    pub const RURAL: &str = "Rural";
    pub const SEMIURBANO: &str = "Semiurbano";

    pub const URBANO_ID: i32 = 1;
    pub const RURAL_ID: i32 = 2;
    pub const SEMIURBANO_ID: i32 = 3;

    /// Category assigned to missing or unrecognized zone labels
    pub const DEFAULT_ZONE: &str = SEMIURBANO;
}

// =============================================================================
// Progress Display
// =============================================================================

/// Progress bar template for batch processing
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Progress bar characters
pub const PROGRESS_CHARS: &str = "#>-";
