//! SEPOMEX SQL Library
//!
//! A Rust library for converting the SEPOMEX postal code catalog published by
//! Correos de México into six ordered SQL bulk-insert scripts.
//!
//! This library provides tools for:
//! - Decoding the windows-1252 source and locating its header past the preamble
//! - Extracting deduplicated catalogs of states, municipalities, cities,
//!   settlement types and zones
//! - Extracting postal codes with nullable foreign keys and zone resolution
//! - Rendering transactional INSERT scripts with SQL-safe literals
//! - Auditing source rows and reporting per-entity statistics

pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod header;
pub mod models;
pub mod normalize;
pub mod processor;
pub mod reader;
pub mod schema;
pub mod validation;
pub mod zone;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::SepomexConfig;
pub use error::{Result, SepomexError};
pub use models::{EntityStats, RunReport};
pub use processor::Pipeline;
pub use schema::EntityKind;
pub use zone::ZoneCatalog;
