//! Target schema description.
//!
//! Describes the six output tables (name, columns, script file name and
//! dependency order) and compiles the fixed-width code patterns every
//! formatted code is checked against.

use crate::config::CodeWidths;
use crate::error::{Result, SepomexError};
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Output entities in foreign-key dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Estados,
    Municipios,
    TiposAsentamiento,
    Zonas,
    Ciudades,
    CodigosPostales,
}

impl EntityKind {
    /// All entities in the order their scripts must be executed
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Estados,
        EntityKind::Municipios,
        EntityKind::TiposAsentamiento,
        EntityKind::Zonas,
        EntityKind::Ciudades,
        EntityKind::CodigosPostales,
    ];

    /// Table layout for this entity
    pub fn table(&self) -> &'static TableSpec {
        match self {
            EntityKind::Estados => &ESTADOS,
            EntityKind::Municipios => &MUNICIPIOS,
            EntityKind::TiposAsentamiento => &TIPOS_ASENTAMIENTO,
            EntityKind::Zonas => &ZONAS,
            EntityKind::Ciudades => &CIUDADES,
            EntityKind::CodigosPostales => &CODIGOS_POSTALES,
        }
    }

    /// 1-based position in the execution order
    pub fn sequence(&self) -> usize {
        match self {
            EntityKind::Estados => 1,
            EntityKind::Municipios => 2,
            EntityKind::TiposAsentamiento => 3,
            EntityKind::Zonas => 4,
            EntityKind::Ciudades => 5,
            EntityKind::CodigosPostales => 6,
        }
    }

    /// Script file name; the numeric prefix encodes execution order
    pub fn file_name(&self) -> String {
        format!("{:03}_insert_{}.sql", self.sequence(), self.table().name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table().label)
    }
}

/// Layout of one output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// SQL table name
    pub name: &'static str,
    /// Column list of the INSERT statement
    pub columns: &'static [&'static str],
    /// Plural description used in comments and logs
    pub label: &'static str,
}

pub static ESTADOS: TableSpec = TableSpec {
    name: "estados",
    columns: &["pk_codigo_estado", "nombre_estado"],
    label: "estados",
};

pub static MUNICIPIOS: TableSpec = TableSpec {
    name: "municipios",
    columns: &["pk_codigo_municipio", "fk_codigo_estado", "nombre_municipio"],
    label: "municipios",
};

pub static TIPOS_ASENTAMIENTO: TableSpec = TableSpec {
    name: "tipos_asentamiento",
    columns: &["pk_codigo_tipo_asentamiento", "nombre_tipo_asentamiento"],
    label: "tipos de asentamiento",
};

pub static ZONAS: TableSpec = TableSpec {
    name: "zonas",
    columns: &["pk_id_zona", "nombre_zona"],
    label: "zonas",
};

pub static CIUDADES: TableSpec = TableSpec {
    name: "ciudades",
    columns: &["pk_codigo_ciudad", "fk_codigo_estado", "nombre_ciudad"],
    label: "ciudades",
};

pub static CODIGOS_POSTALES: TableSpec = TableSpec {
    name: "codigos_postales",
    columns: &[
        "codigo_postal",
        "nombre_asentamiento",
        "fk_codigo_estado",
        "fk_codigo_municipio",
        "fk_codigo_ciudad",
        "fk_codigo_tipo_asentamiento",
        "fk_id_zona",
    ],
    label: "códigos postales",
};

/// Fixed-width, all-digit code pattern
#[derive(Debug, Clone)]
pub struct CodePattern {
    width: usize,
    regex: Regex,
}

impl CodePattern {
    /// Compile the pattern `^[0-9]{width}$`
    pub fn digits(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(SepomexError::configuration("code width must be positive"));
        }
        let regex = Regex::new(&format!("^[0-9]{{{width}}}$")).map_err(|e| {
            SepomexError::configuration(format!("invalid code pattern of width {width}: {e}"))
        })?;
        Ok(Self { width, regex })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Full match of an already trimmed value
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Display for CodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}

/// Compiled code patterns of the target schema
#[derive(Debug, Clone)]
pub struct SchemaContract {
    pub codigo_postal: CodePattern,
    pub estado: CodePattern,
    pub municipio: CodePattern,
    pub ciudad: CodePattern,
    pub tipo_asentamiento: CodePattern,
    pub oficina: CodePattern,
    pub asentamiento_consecutivo: CodePattern,
}

impl SchemaContract {
    /// Compile patterns for the configured code widths
    pub fn new(widths: &CodeWidths) -> Result<Self> {
        Ok(Self {
            codigo_postal: CodePattern::digits(widths.codigo_postal)?,
            estado: CodePattern::digits(widths.estado)?,
            municipio: CodePattern::digits(widths.municipio)?,
            ciudad: CodePattern::digits(widths.ciudad)?,
            tipo_asentamiento: CodePattern::digits(widths.tipo_asentamiento)?,
            oficina: CodePattern::digits(widths.oficina)?,
            asentamiento_consecutivo: CodePattern::digits(widths.asentamiento_consecutivo)?,
        })
    }
}
