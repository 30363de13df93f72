//! Record-count reconciliation between sources and documents.

use indexmap::IndexSet;
use tracing::debug;

use super::finding::Finding;
use super::report::{ReportKind, TableDetail, TableStatus, ValidationReport};
use crate::dataset::SubjectDataset;
use crate::loader::TableLoader;
use crate::registry::TableRegistry;
use crate::sources::SourceSet;

/// Compares record counts across artifacts.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationChecker<'a> {
    registry: &'a TableRegistry,
    loader: &'a TableLoader,
}

impl<'a> ReconciliationChecker<'a> {
    pub fn new(registry: &'a TableRegistry, loader: &'a TableLoader) -> Self {
        Self { registry, loader }
    }

    /// Check a dataset's declared counts against its actual record arrays.
    ///
    /// Every key whose declared count differs from its array length, or that
    /// appears in only one of the two sections, is an error.
    pub fn declared_vs_actual(&self, dataset: &SubjectDataset) -> ValidationReport {
        let mut report = ValidationReport::new(ReportKind::Consistency)
            .with_subject(dataset.subject_info.subject_name.clone());

        for check in declared_counts(self.registry, dataset) {
            let status = match check.finding {
                Some(finding) => {
                    report.record(finding);
                    TableStatus::Mismatch
                }
                None => TableStatus::Ok,
            };
            report.add_table(
                check.table,
                TableDetail::new(check.actual.unwrap_or(0), status).with_present(check.actual.is_some()),
            );
        }

        report
    }

    /// Re-count every source table and compare with the document's arrays.
    ///
    /// Absent and unreadable sources count as zero records, and a table
    /// missing from the document counts as zero too.
    pub fn source_vs_document(
        &self,
        subject_name: &str,
        dataset: &SubjectDataset,
        sources: &dyn SourceSet,
    ) -> ValidationReport {
        let mut report =
            ValidationReport::new(ReportKind::Comparison).with_subject(subject_name.to_string());

        let document_subject = &dataset.subject_info.subject_name;
        if !document_subject.is_empty() && document_subject != subject_name {
            report.record(Finding::SubjectMismatch {
                document: document_subject.clone(),
                sources: subject_name.to_string(),
            });
        }

        for table in self.registry.tables() {
            let (source_records, source_status) = match sources.fetch(table) {
                Ok(Some(bytes)) => match self.loader.count_rows(&bytes) {
                    Ok(count) => (count, TableStatus::Ok),
                    Err(e) => {
                        debug!(table = %table.external_name, error = %e, "source unreadable, counting as empty");
                        (0, TableStatus::Unreadable)
                    }
                },
                Ok(None) => (0, TableStatus::Absent),
                Err(e) => {
                    debug!(table = %table.external_name, error = %e, "source unreadable, counting as empty");
                    (0, TableStatus::Unreadable)
                }
            };

            let document_records = match dataset.records(&table.internal_key) {
                Some(records) => records.len(),
                None => {
                    report.record(Finding::TableAbsentFromDocument {
                        table: table.external_name.clone(),
                    });
                    0
                }
            };

            let status = if source_records != document_records {
                report.record(Finding::RecordCountMismatch {
                    table: table.external_name.clone(),
                    source_records,
                    document_records,
                });
                TableStatus::Mismatch
            } else {
                source_status
            };

            report.add_table(
                table.external_name.clone(),
                TableDetail::new(source_records, status)
                    .with_document_records(document_records)
                    .with_present(matches!(source_status, TableStatus::Ok)),
            );
        }

        report
    }

}

/// Declared count against array length for one key.
#[derive(Debug, Clone)]
pub(crate) struct CountCheck {
    /// Table label, or the raw key when the registry does not know it.
    pub table: String,
    /// Length of the key's array, if the array exists.
    pub actual: Option<usize>,
    pub finding: Option<Finding>,
}

/// Compare declared counts with array lengths for every key in either section.
pub(crate) fn declared_counts(registry: &TableRegistry, dataset: &SubjectDataset) -> Vec<CountCheck> {
    let keys: IndexSet<&str> = dataset
        .statistics
        .keys()
        .chain(dataset.tables.keys())
        .map(String::as_str)
        .collect();

    keys.into_iter()
        .map(|key| {
            let table = registry
                .find(key)
                .map(|t| t.external_name.clone())
                .unwrap_or_else(|| key.to_string());
            let declared = dataset.statistics.get(key).copied();
            let actual = dataset.tables.get(key).map(Vec::len);

            let finding = match (declared, actual) {
                (Some(declared), Some(actual)) if declared == actual => None,
                (Some(declared), Some(actual)) => Some(Finding::DeclaredCountMismatch {
                    table: table.clone(),
                    declared,
                    actual,
                }),
                (Some(declared), None) => Some(Finding::UndocumentedTable {
                    table: table.clone(),
                    declared,
                }),
                (None, actual) => Some(Finding::UndeclaredTable {
                    table: table.clone(),
                    actual: actual.unwrap_or(0),
                }),
            };

            CountCheck {
                table,
                actual,
                finding,
            }
        })
        .collect()
}
