//! Checks on a produced document by itself.

use indexmap::IndexSet;
use serde_json::Value;

use super::finding::Finding;
use super::reconcile::declared_counts;
use super::report::{ReportKind, TableDetail, TableStatus, ValidationReport};
use crate::dataset::SubjectDataset;
use crate::input::is_blank_or_missing;
use crate::loader::Record;
use crate::registry::TableRegistry;

/// Check a document against the registry.
///
/// Tables missing from `data` and unknown table keys are warnings, as is a
/// schema version other than the registry's. Blank or missing-value text
/// left in place of null and an empty subject identifier are errors. Count
/// errors are the same ones the declared-vs-actual check raises.
pub fn check_document(registry: &TableRegistry, dataset: &SubjectDataset) -> ValidationReport {
    let info = &dataset.subject_info;
    let mut report = ValidationReport::new(ReportKind::Document);
    if !info.subject_name.is_empty() {
        report = report.with_subject(info.subject_name.clone());
    }

    if info.subject_id.trim().is_empty() {
        report.record(Finding::EmptySubjectId);
    }

    if info.schema_version != registry.schema_version() {
        report.record(Finding::SchemaVersionMismatch {
            found: info.schema_version.clone(),
            expected: registry.schema_version().to_string(),
        });
    }

    let mut miscounted = IndexSet::new();
    for check in declared_counts(registry, dataset) {
        if let Some(finding) = check.finding {
            report.record(finding);
            miscounted.insert(check.table);
        }
    }

    for table in registry.tables() {
        let Some(records) = dataset.records(&table.internal_key) else {
            report.record(Finding::TableAbsentFromDocument {
                table: table.external_name.clone(),
            });
            report.add_table(
                table.external_name.clone(),
                TableDetail::new(0, TableStatus::Absent),
            );
            continue;
        };

        let mut status = TableStatus::Ok;

        let unnormalized = count_unnormalized(records);
        if unnormalized > 0 {
            report.record(Finding::UnnormalizedMissing {
                table: table.external_name.clone(),
                count: unnormalized,
            });
            status = TableStatus::Mismatch;
        }

        if miscounted.contains(&table.external_name) {
            status = TableStatus::Mismatch;
        }

        let fields = records.first().map(Record::len).unwrap_or(0);
        report.add_table(
            table.external_name.clone(),
            TableDetail::new(records.len(), status).with_fields(fields),
        );
    }

    for key in dataset.tables.keys() {
        if registry.find(key).is_none() {
            report.record(Finding::UnknownTableKey { key: key.clone() });
        }
    }

    report
}

/// Count string cells that should have been written as null.
fn count_unnormalized(records: &[Record]) -> usize {
    records
        .iter()
        .flat_map(|record| record.values())
        .filter(|value| matches!(value, Value::String(s) if is_blank_or_missing(s)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SubjectInfo;
    use crate::loader::TableLoader;
    use crate::validation::ReconciliationChecker;
    use indexmap::IndexMap;
    use serde_json::json;

    fn dataset() -> SubjectDataset {
        let registry = TableRegistry::standard();
        let mut statistics = IndexMap::new();
        let mut tables = IndexMap::new();
        for key in registry.internal_keys() {
            statistics.insert(key.to_string(), 0);
            tables.insert(key.to_string(), Vec::new());
        }
        SubjectDataset {
            subject_info: SubjectInfo {
                subject_id: "HX001".to_string(),
                subject_name: "河西联办煤矿".to_string(),
                survey_date: None,
                standard_id: registry.standard_id().to_string(),
                schema_version: registry.schema_version().to_string(),
            },
            statistics,
            tables,
        }
    }

    fn row(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_clean_document() {
        let report = check_document(TableRegistry::standard(), &dataset());
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
        assert_eq!(report.found, 10);
    }

    #[test]
    fn test_nan_text_is_error() {
        let mut data = dataset();
        data.tables.insert(
            "goaf_gas_info".to_string(),
            vec![row(&[("mine_id", json!("HX001")), ("gas_concentration", json!("NaN"))])],
        );
        data.statistics.insert("goaf_gas_info".to_string(), 1);

        let report = check_document(TableRegistry::standard(), &data);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("采空区积气信息"));
    }

    #[test]
    fn test_missing_table_and_unknown_key_are_warnings() {
        let mut data = dataset();
        data.tables.shift_remove("treatment_info");
        data.statistics.shift_remove("treatment_info");
        data.tables.insert("notes".to_string(), Vec::new());
        data.statistics.insert("notes".to_string(), 0);

        let report = check_document(TableRegistry::standard(), &data);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.per_table["采空区治理信息"].status, TableStatus::Absent);
    }

    #[test]
    fn test_counts_agree_with_consistency_check() {
        let registry = TableRegistry::standard();
        let loader = TableLoader::new();
        let mut data = dataset();
        data.statistics.insert("crack_info".to_string(), 4);
        data.statistics.shift_remove("fire_info");
        data.tables.shift_remove("seal_wall_info");

        let report = check_document(registry, &data);
        let consistency =
            ReconciliationChecker::new(registry, &loader).declared_vs_actual(&data);

        assert_eq!(report.errors, consistency.errors);
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.per_table["地裂缝信息"].status, TableStatus::Mismatch);
        assert_eq!(report.per_table["自燃发火信息"].status, TableStatus::Mismatch);
        assert_eq!(report.per_table["密闭墙信息"].status, TableStatus::Absent);
    }

    #[test]
    fn test_empty_subject_id() {
        let mut data = dataset();
        data.subject_info.subject_id = String::new();
        let report = check_document(TableRegistry::standard(), &data);
        assert_eq!(report.errors, vec!["document has an empty mine_id"]);
    }

    #[test]
    fn test_version_mismatch_is_warning() {
        let mut data = dataset();
        data.subject_info.schema_version = "0.9".to_string();
        let report = check_document(TableRegistry::standard(), &data);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
    }
}
