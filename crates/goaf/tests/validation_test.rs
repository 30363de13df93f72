//! Integration tests for source, document, and reconciliation checks.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use goaf::validation::TableStatus;
use goaf::{Converter, SubjectDataset, TableRegistry, Validator};

/// Write every table except the ones listed, each with `rows` rows.
fn write_subject(dir: &Path, subject: &str, rows: usize, skip: &[&str]) {
    for table in TableRegistry::standard().tables() {
        if skip.contains(&table.table_id.as_str()) {
            continue;
        }
        let mut text = table
            .expected_fields
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        text.push('\n');
        for i in 0..rows {
            let row: Vec<String> = table
                .expected_fields
                .iter()
                .map(|f| match f.as_str() {
                    "mine_id" => "SB001".to_string(),
                    "remark" => String::new(),
                    _ => format!("{}", i + 1),
                })
                .collect();
            text.push_str(&row.join(","));
            text.push('\n');
        }
        fs::write(dir.join(table.file_name(subject, "csv")), text).unwrap();
    }
}

/// Convert a subject in `dir` and write its document there.
fn convert(dir: &Path, subject: &str) -> PathBuf {
    let converter = Converter::new();
    let assembly = converter.convert_dir(dir, subject);
    converter.write_document(&assembly, dir).unwrap()
}

/// Edit a written document in place.
fn edit_document(path: &Path, edit: impl FnOnce(&mut Value)) {
    let mut document: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    edit(&mut document);
    fs::write(path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_fresh_conversion_verifies() {
    let dir = TempDir::new().unwrap();
    write_subject(dir.path(), "盛博煤矿", 3, &["T02"]);
    let document = convert(dir.path(), "盛博煤矿");

    let converter = Converter::new();
    let sources = converter.sources(dir.path(), "盛博煤矿");
    let verification = Validator::standard()
        .verify("盛博煤矿", &document, &sources)
        .unwrap();

    assert!(verification.passed(), "{}", verification.render_text());
    assert_eq!(verification.source.total_records, 27);
    assert_eq!(verification.source.warnings.len(), 1);

    let comparison = verification.comparison.as_ref().unwrap();
    assert!(comparison.is_ok());
    assert_eq!(comparison.per_table["采空区积水信息"].status, TableStatus::Absent);
    assert_eq!(comparison.per_table["地裂缝信息"].document_records, Some(3));
    assert!(verification.render_text().contains("Verification passed"));
}

// =============================================================================
// Count Mismatches
// =============================================================================

#[test]
fn test_wrong_declared_count() {
    let dir = TempDir::new().unwrap();
    write_subject(dir.path(), "盛博煤矿", 2, &[]);
    let document = convert(dir.path(), "盛博煤矿");
    edit_document(&document, |doc| {
        doc["statistics"]["crack_info"] = Value::from(5);
    });

    let validator = Validator::standard();
    let (dataset, report) = validator.validate_document_file(&document).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("地裂缝信息"));
    assert!(report.errors[0].contains("declares 5"));

    let consistency = validator.consistency(&dataset);
    assert_eq!(consistency.errors.len(), 1);
    assert_eq!(consistency.per_table["地裂缝信息"].status, TableStatus::Mismatch);

    let sources = Converter::new().sources(dir.path(), "盛博煤矿");
    let verification = validator.verify("盛博煤矿", &document, &sources).unwrap();
    assert!(!verification.passed());
}

#[test]
fn test_source_changed_after_conversion() {
    let dir = TempDir::new().unwrap();
    write_subject(dir.path(), "盛博煤矿", 2, &[]);
    let document = convert(dir.path(), "盛博煤矿");

    // One more seal wall surveyed since the document was produced.
    write_subject(dir.path(), "盛博煤矿", 3, &[
        "T01", "T02", "T03", "T04", "T05", "T06", "T07", "T08", "T10",
    ]);

    let validator = Validator::standard();
    let dataset = SubjectDataset::load(&document).unwrap();
    let sources = Converter::new().sources(dir.path(), "盛博煤矿");
    let comparison = validator.compare("盛博煤矿", &dataset, &sources);

    assert_eq!(comparison.errors, vec!["密闭墙信息: source has 3 record(s), document has 2"]);
    assert_eq!(comparison.per_table["密闭墙信息"].records, 3);
}

#[test]
fn test_table_dropped_from_document() {
    let dir = TempDir::new().unwrap();
    write_subject(dir.path(), "盛博煤矿", 1, &[]);
    let document = convert(dir.path(), "盛博煤矿");
    edit_document(&document, |doc| {
        if let Some(data) = doc["data"].as_object_mut() {
            data.remove("fire_info");
        }
        if let Some(statistics) = doc["statistics"].as_object_mut() {
            statistics.remove("fire_info");
        }
    });

    let validator = Validator::standard();
    let sources = Converter::new().sources(dir.path(), "盛博煤矿");
    let verification = validator.verify("盛博煤矿", &document, &sources).unwrap();

    assert!(verification.document.is_ok());
    assert!(verification.document.warnings[0].contains("自燃发火信息"));
    let comparison = verification.comparison.unwrap();
    assert_eq!(comparison.errors.len(), 1);
    assert!(comparison.errors[0].contains("source has 1 record(s), document has 0"));
}

// =============================================================================
// Field and Structure Checks
// =============================================================================

#[test]
fn test_renamed_field_warns_only() {
    let dir = TempDir::new().unwrap();
    write_subject(dir.path(), "盛博煤矿", 1, &["T02"]);
    fs::write(
        dir.path().join("盛博煤矿-采空区积水信息.csv"),
        "mine_id,goaf_id,water_area_m2\nSB001,G1,12\n",
    )
    .unwrap();

    let sources = Converter::new().sources(dir.path(), "盛博煤矿");
    let report = Validator::standard().validate_sources("盛博煤矿", &sources);

    assert!(report.is_ok());
    assert_eq!(report.found, 10);
    assert_eq!(report.per_table["采空区积水信息"].fields, Some(3));
    assert!(report.warnings.iter().any(|w| w.contains("water_area_m2")));
}

#[test]
fn test_missing_section_is_structural() {
    let dir = TempDir::new().unwrap();
    write_subject(dir.path(), "盛博煤矿", 1, &[]);
    let document = convert(dir.path(), "盛博煤矿");
    edit_document(&document, |doc| {
        if let Some(root) = doc.as_object_mut() {
            root.remove("data");
        }
    });

    let sources = Converter::new().sources(dir.path(), "盛博煤矿");
    let verification = Validator::standard()
        .verify("盛博煤矿", &document, &sources)
        .unwrap();

    assert!(!verification.passed());
    assert!(verification.comparison.is_none());
    assert!(verification.source.is_ok());
    assert!(verification.document.errors[0].contains("data"));
}

#[test]
fn test_custom_schema_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.json");
    fs::write(&path, goaf::schema::EMBEDDED_SCHEMA.replace("\"1.0.0\"", "\"1.1.0\"")).unwrap();

    let validator = Validator::from_schema_path(&path).unwrap();
    assert_eq!(validator.registry().schema_version(), "1.1.0");

    write_subject(dir.path(), "盛博煤矿", 1, &[]);
    let document = convert(dir.path(), "盛博煤矿");
    let (_, report) = validator.validate_document_file(&document).unwrap();
    assert!(report.is_ok());
    assert!(report.warnings[0].contains("1.1.0"));
}
