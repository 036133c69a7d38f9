//! Configuration management and validation.
//!
//! Provides the generator configuration: source encoding and separator,
//! batch sizing, name length limits, code widths of the target schema and
//! the zone catalog. Values come from defaults, an optional TOML file and
//! CLI overrides, in that order.

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_ENCODING, DEFAULT_SEPARATOR, MAX_LEN_NOMBRE,
    MAX_LEN_NOMBRE_ASENTAMIENTO, code_widths,
};
use crate::error::{Result, SepomexError};
use crate::schema::SchemaContract;
use crate::zone::ZoneCatalog;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Maximum character lengths of cleaned names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameLimits {
    /// States, municipalities, cities, settlement types and zones
    pub nombre: usize,
    /// Settlement names
    pub nombre_asentamiento: usize,
}

impl Default for NameLimits {
    fn default() -> Self {
        Self {
            nombre: MAX_LEN_NOMBRE,
            nombre_asentamiento: MAX_LEN_NOMBRE_ASENTAMIENTO,
        }
    }
}

/// Digit widths of every formatted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeWidths {
    pub codigo_postal: usize,
    pub estado: usize,
    pub municipio: usize,
    pub ciudad: usize,
    pub tipo_asentamiento: usize,
    pub oficina: usize,
    pub asentamiento_consecutivo: usize,
}

impl Default for CodeWidths {
    fn default() -> Self {
        Self {
            codigo_postal: code_widths::CODIGO_POSTAL,
            estado: code_widths::ESTADO,
            municipio: code_widths::MUNICIPIO,
            ciudad: code_widths::CIUDAD,
            tipo_asentamiento: code_widths::TIPO_ASENTAMIENTO,
            oficina: code_widths::OFICINA,
            asentamiento_consecutivo: code_widths::ASENTAMIENTO_CONSECUTIVO,
        }
    }
}

/// Main configuration for SQL generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SepomexConfig {
    /// `encoding_rs` label of the source file
    pub encoding: String,

    /// Field separator of the source file
    pub separator: char,

    /// Postal-code rows rendered per write
    pub batch_size: usize,

    pub limits: NameLimits,

    pub code_widths: CodeWidths,

    /// Zone taxonomy used for the zone script and postal-code foreign keys
    pub zones: ZoneCatalog,

    /// Show a progress bar while writing postal codes
    pub show_progress: bool,
}

impl Default for SepomexConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            separator: DEFAULT_SEPARATOR,
            batch_size: DEFAULT_BATCH_SIZE,
            limits: NameLimits::default(),
            code_widths: CodeWidths::default(),
            zones: ZoneCatalog::default(),
            show_progress: true,
        }
    }
}

impl SepomexConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SepomexError::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| SepomexError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Set the postal-code batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the source encoding label
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Replace the zone taxonomy
    pub fn with_zone_catalog(mut self, zones: ZoneCatalog) -> Self {
        self.zones = zones;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Resolve the configured encoding label
    pub fn source_encoding(&self) -> Result<&'static encoding_rs::Encoding> {
        encoding_rs::Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            SepomexError::configuration(format!("unknown encoding label '{}'", self.encoding))
        })
    }

    /// Separator as a single byte for the CSV reader
    pub fn separator_byte(&self) -> Result<u8> {
        u8::try_from(self.separator)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                SepomexError::configuration(format!(
                    "separator '{}' must be a single ASCII character",
                    self.separator
                ))
            })
    }

    /// Compile the code patterns for the configured widths
    pub fn schema_contract(&self) -> Result<SchemaContract> {
        SchemaContract::new(&self.code_widths)
    }

    /// Check the configuration is usable before any input is read
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SepomexError::configuration("batch_size must be greater than 0"));
        }
        if self.limits.nombre == 0 || self.limits.nombre_asentamiento == 0 {
            return Err(SepomexError::configuration("name limits must be greater than 0"));
        }
        if self.separator == '\n' || self.separator == '\r' || self.separator == '"' {
            return Err(SepomexError::configuration(format!(
                "separator {:?} is not allowed",
                self.separator
            )));
        }
        self.source_encoding()?;
        self.separator_byte()?;
        self.schema_contract()?;
        Ok(())
    }
}
