//! Error handling integration tests

use super::{HEADER, ROWS, read_script, write_source};
use crate::config::SepomexConfig;
use crate::error::SepomexError;
use crate::processor::Pipeline;
use crate::schema::EntityKind;
use std::fs;
use tempfile::TempDir;

fn config() -> SepomexConfig {
    SepomexConfig::default().without_progress()
}

#[test]
fn test_nonexistent_input() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("CPdescarga.txt");
    let output_dir = temp_dir.path().join("out");

    let result = Pipeline::new(config(), &output_dir).unwrap().run(&missing);

    match result.unwrap_err() {
        SepomexError::InputNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected InputNotFound error, got {other}"),
    }
    assert!(!output_dir.exists());
}

#[test]
fn test_source_without_header() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("CPdescarga.txt");
    fs::write(&input, "codigo|asentamiento\n83000|Centro\n").unwrap();
    let output_dir = temp_dir.path().join("out");

    let result = Pipeline::new(config(), &output_dir).unwrap().run(&input);

    assert!(matches!(result, Err(SepomexError::InvalidFormat { .. })));
    assert!(!output_dir.exists());
}

#[test]
fn test_header_beyond_preamble_limit() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("CPdescarga.txt");
    let mut text = "aviso\n".repeat(11);
    text.push_str(HEADER);
    text.push('\n');
    text.push_str(ROWS[0]);
    fs::write(&input, text).unwrap();

    let result = Pipeline::new(config(), temp_dir.path().join("out"))
        .unwrap()
        .run(&input);

    assert!(matches!(result, Err(SepomexError::InvalidFormat { .. })));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let result = Pipeline::new(config().with_batch_size(0), temp_dir.path());
    assert!(matches!(result, Err(SepomexError::Configuration { .. })));

    let result = Pipeline::new(config().with_encoding("klingon"), temp_dir.path());
    assert!(matches!(result, Err(SepomexError::Configuration { .. })));
}

#[test]
fn test_missing_column_degrades_one_entity() {
    let temp_dir = TempDir::new().unwrap();
    let header = HEADER.replace("|d_ciudad|", "|d_ciudad_renamed|");
    let input = write_source(temp_dir.path(), &header, &ROWS);
    let output_dir = temp_dir.path().join("out");

    let report = Pipeline::new(config(), &output_dir)
        .unwrap()
        .run(&input)
        .unwrap();

    let ciudades = report.entity(EntityKind::Ciudades).unwrap();
    assert_eq!(
        ciudades.structural_error.as_deref(),
        Some("missing required columns: d_ciudad")
    );
    assert_eq!(ciudades.written, 0);
    assert_eq!(
        read_script(&output_dir, "005_insert_ciudades.sql"),
        "BEGIN;\n-- No se encontraron ciudades válidos\nCOMMIT;\n"
    );

    let others: Vec<_> = report
        .entities
        .iter()
        .filter(|stats| stats.entity != EntityKind::Ciudades)
        .collect();
    assert!(others.iter().all(|stats| stats.structural_error.is_none()));
    assert_eq!(report.entity(EntityKind::CodigosPostales).unwrap().written, 3);
}

#[test]
fn test_header_only_source_writes_placeholders() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(temp_dir.path(), HEADER, &[]);
    let output_dir = temp_dir.path().join("out");

    let report = Pipeline::new(config(), &output_dir)
        .unwrap()
        .run(&input)
        .unwrap();

    assert_eq!(report.input_rows, 0);
    assert_eq!(
        read_script(&output_dir, "001_insert_estados.sql"),
        "BEGIN;\n-- No se encontraron estados válidos\nCOMMIT;\n"
    );
    assert_eq!(
        read_script(&output_dir, "006_insert_codigos_postales.sql"),
        "BEGIN;\n-- No se encontraron códigos postales válidos\nCOMMIT;\n"
    );
    assert_eq!(report.entity(EntityKind::Zonas).unwrap().written, 3);
}

#[test]
fn test_write_failure_does_not_stop_other_entities() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(temp_dir.path(), HEADER, &ROWS);
    let output_dir = temp_dir.path().join("out");
    // A directory in place of the script makes the final rename fail
    let blocked = EntityKind::TiposAsentamiento.file_name();
    fs::create_dir_all(output_dir.join(&blocked).join("occupied")).unwrap();

    let report = Pipeline::new(config(), &output_dir)
        .unwrap()
        .run(&input)
        .unwrap();

    let tipos = report.entity(EntityKind::TiposAsentamiento).unwrap();
    assert!(tipos.write_error.is_some());
    assert!(tipos.output.is_none());
    assert_eq!(report.write_failures(), 1);

    for entity in EntityKind::ALL {
        if entity != EntityKind::TiposAsentamiento {
            assert!(output_dir.join(entity.file_name()).is_file());
        }
    }
    assert!(output_dir.join(&blocked).is_dir());
}

#[test]
fn test_ragged_rows_are_counted() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_source(
        temp_dir.path(),
        HEADER,
        &[ROWS[0], "83020|Las Palmas|Colonia|Hermosillo", ROWS[3]],
    );
    let output_dir = temp_dir.path().join("out");

    let report = Pipeline::new(config(), &output_dir)
        .unwrap()
        .run(&input)
        .unwrap();

    let codigos = report.entity(EntityKind::CodigosPostales).unwrap();
    assert_eq!(codigos.scanned, 3);
    assert_eq!(codigos.row_errors, 1);
    assert_eq!(codigos.written, 2);
    assert_eq!(codigos.reasons.get("malformed row"), Some(&1));
}
