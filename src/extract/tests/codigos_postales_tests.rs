//! Postal-code extraction tests

use super::{extractor, records_from, sepomex_records};
use crate::config::SepomexConfig;
use crate::extract::Extractor;
use crate::models::{CodigoPostal, EntityStats};
use crate::schema::EntityKind;
use crate::validation::Validator;
use crate::zone::{ZoneCatalog, ZoneDefinition};

#[test]
fn test_optional_keys_become_null() {
    let records = sepomex_records(&[
        "85000.0|Centro|Colonia||Sonora||85001|5|85001||09||0001|urbano|",
    ]);

    let extraction = extractor().codigos_postales(&records);

    assert_eq!(
        extraction.entities,
        vec![CodigoPostal {
            codigo: "85000".to_string(),
            asentamiento: "Centro".to_string(),
            estado: "05".to_string(),
            municipio: None,
            ciudad: None,
            tipo_asentamiento: "09".to_string(),
            zona: 1,
        }]
    );
    assert_eq!(extraction.stats.error_count(), 0);
}

#[test]
fn test_missing_postal_code_is_one_error() {
    let records = sepomex_records(&[
        "|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|Urbano|",
        "83000|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|Urbano|",
    ]);

    let extraction = extractor().codigos_postales(&records);

    assert_eq!(extraction.entities.len(), 1);
    assert_eq!(extraction.entities[0].codigo, "83000");
    assert_eq!(extraction.stats.scanned, 2);
    assert_eq!(extraction.stats.rejected, 1);
    assert_eq!(extraction.stats.error_count(), 1);
    assert_eq!(extraction.stats.reasons.get("d_codigo: empty"), Some(&1));
}

#[test]
fn test_unknown_zone_uses_default() {
    let records = sepomex_records(&[
        "83000|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|Pueblo|",
        "83001|Norte|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0002||",
        "83002|Sur|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0003|  RURAL |",
    ]);

    let extraction = extractor().codigos_postales(&records);

    let zonas: Vec<i32> = extraction.entities.iter().map(|cp| cp.zona).collect();
    assert_eq!(zonas, vec![3, 3, 2]);
}

#[test]
fn test_invalid_optional_keys_degrade_to_null() {
    let records = sepomex_records(&[
        "83000|Centro|Colonia|Hermosillo|Sonora|Hermosillo|83001|26|83001||09|1234|0001|Urbano|xx",
    ]);

    let extraction = extractor().codigos_postales(&records);

    assert_eq!(extraction.entities.len(), 1);
    assert_eq!(extraction.entities[0].municipio, None);
    assert_eq!(extraction.entities[0].ciudad, None);
    assert_eq!(extraction.stats.rejected, 0);
    assert_eq!(
        extraction.stats.reasons.get("c_mnpio: pattern mismatch"),
        Some(&1)
    );
}

#[test]
fn test_present_keys_are_padded() {
    let records = sepomex_records(&[
        "1000|San Ángel|Colonia|Álvaro Obregón|Ciudad de México|Ciudad de México|01001|9|01001||9|10.0|0001|Urbano|1",
    ]);

    let extraction = extractor().codigos_postales(&records);

    let cp = &extraction.entities[0];
    assert_eq!(cp.codigo, "01000");
    assert_eq!(cp.asentamiento, "San Ángel");
    assert_eq!(cp.estado, "09");
    assert_eq!(cp.municipio.as_deref(), Some("010"));
    assert_eq!(cp.ciudad.as_deref(), Some("01"));
    assert_eq!(cp.tipo_asentamiento, "09");
}

#[test]
fn test_duplicate_postal_codes_are_kept() {
    let records = sepomex_records(&[
        "83000|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|Urbano|",
        "83000|Centro Norte|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0002|Urbano|",
    ]);

    let extraction = extractor().codigos_postales(&records);

    assert_eq!(extraction.entities.len(), 2);
    assert_eq!(extraction.stats.duplicates, 0);
}

#[test]
fn test_every_problem_of_a_row_is_tallied() {
    let records = sepomex_records(&["||Colonia|Hermosillo|Sonora||83001|ab|83001||||0001|Urbano|"]);

    let extraction = extractor().codigos_postales(&records);

    assert!(extraction.entities.is_empty());
    assert_eq!(extraction.stats.rejected, 1);
    let reasons = &extraction.stats.reasons;
    assert_eq!(reasons.get("d_codigo: empty"), Some(&1));
    assert_eq!(reasons.get("d_asenta: empty"), Some(&1));
    assert_eq!(reasons.get("c_estado: pattern mismatch"), Some(&1));
    assert_eq!(reasons.get("c_tipo_asenta: empty"), Some(&1));
}

#[test]
fn test_batches_match_single_pass() {
    let lines = [
        "83000|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|Urbano|",
        "|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|Urbano|",
        "83010|Norte|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0002|Rural|",
        "83020|Sur|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0003|Semiurbano|",
        "83030|Este|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0004|Urbano|",
    ];
    let records = sepomex_records(&lines);
    let extractor = extractor();

    let whole = extractor.codigos_postales(&records);

    let mut stats = EntityStats::new(EntityKind::CodigosPostales);
    let mut validator = Validator::new();
    let mut batched = Vec::new();
    for batch in records.records().chunks(2) {
        batched.extend(extractor.codigos_postales_batch(batch, &mut validator, &mut stats));
    }
    extractor.finish_codigos_postales(validator, &mut stats);

    assert_eq!(batched, whole.entities);
    assert_eq!(stats.scanned, whole.stats.scanned);
    assert_eq!(stats.rejected, whole.stats.rejected);
    assert_eq!(stats.reasons, whole.stats.reasons);
}

#[test]
fn test_missing_required_column_is_structural() {
    let header = "d_codigo|d_asenta|c_estado|d_zona";
    let records = records_from(header, &["83000|Centro|26|Urbano"]);

    let extraction = extractor().codigos_postales(&records);

    assert!(extraction.entities.is_empty());
    assert_eq!(
        extraction.stats.structural_error.as_deref(),
        Some("missing required columns: c_tipo_asenta")
    );
}

#[test]
fn test_zone_column_is_optional() {
    let header = "d_codigo|d_asenta|c_estado|c_tipo_asenta";
    let records = records_from(header, &["83000|Centro|26|09"]);

    let extraction = extractor().codigos_postales(&records);

    assert_eq!(extraction.entities.len(), 1);
    assert_eq!(extraction.entities[0].zona, 3);
}

#[test]
fn test_zone_ids_follow_injected_catalog() {
    let catalog = ZoneCatalog::new(
        vec![
            ZoneDefinition {
                id: 7,
                name: "Urbano".to_string(),
            },
            ZoneDefinition {
                id: 8,
                name: "No Urbano".to_string(),
            },
        ],
        "No Urbano",
    )
    .unwrap();
    let extractor =
        Extractor::new(&SepomexConfig::default().with_zone_catalog(catalog)).unwrap();
    let records = sepomex_records(&[
        "83000|Centro|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0001|urbano|",
        "83001|Norte|Colonia|Hermosillo|Sonora||83001|26|83001||09|030|0002|Rural|",
    ]);

    let extraction = extractor.codigos_postales(&records);

    let zonas: Vec<i32> = extraction.entities.iter().map(|cp| cp.zona).collect();
    assert_eq!(zonas, vec![7, 8]);
}
