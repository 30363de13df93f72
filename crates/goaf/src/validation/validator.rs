//! Configured checker for sources, documents, and their agreement.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::document::check_document;
use super::fields::check_fields;
use super::finding::Finding;
use super::reconcile::ReconciliationChecker;
use super::report::{ReportKind, TableDetail, TableStatus, ValidationReport};
use crate::dataset::SubjectDataset;
use crate::error::{GoafError, Result};
use crate::input::ParserConfig;
use crate::loader::TableLoader;
use crate::registry::TableRegistry;
use crate::schema::Schema;
use crate::sources::SourceSet;

/// Checks source tables and produced documents against one registry.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: TableRegistry,
    loader: TableLoader,
}

impl Validator {
    /// Create a validator from a schema.
    pub fn new(schema: &Schema) -> Result<Self> {
        Ok(Self {
            registry: TableRegistry::from_schema(schema)?,
            loader: TableLoader::new(),
        })
    }

    /// Create a validator from a schema file.
    pub fn from_schema_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(&Schema::load(path)?)
    }

    /// Validator over the embedded schema.
    pub fn standard() -> Self {
        Self {
            registry: TableRegistry::standard().clone(),
            loader: TableLoader::new(),
        }
    }

    /// Use a custom parser configuration when reading sources.
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.loader = TableLoader::with_config(config);
        self
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Check every source table of a subject against the schema.
    pub fn validate_sources(&self, subject_name: &str, sources: &dyn SourceSet) -> ValidationReport {
        let mut report =
            ValidationReport::new(ReportKind::Source).with_subject(subject_name.to_string());

        for table in self.registry.tables() {
            let label = table.external_name.clone();

            let bytes = match sources.fetch(table) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    report.record(Finding::SourceAbsent { table: label.clone() });
                    report.add_table(label, TableDetail::new(0, TableStatus::Absent));
                    continue;
                }
                Err(e) => {
                    report.record(Finding::SourceUnreadable {
                        table: label.clone(),
                        reason: e.to_string(),
                    });
                    report.add_table(label, TableDetail::new(0, TableStatus::Unreadable));
                    continue;
                }
            };

            let parsed = match self.loader.parse(&bytes) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(table = %label, error = %e, "source unreadable");
                    report.record(Finding::SourceUnreadable {
                        table: label.clone(),
                        reason: e.to_string(),
                    });
                    report.add_table(label, TableDetail::new(0, TableStatus::Unreadable));
                    continue;
                }
            };

            for finding in check_fields(table, parsed.headers.as_slice()).findings(&label) {
                report.record(finding);
            }
            if parsed.skipped_rows > 0 {
                report.record(Finding::RowsSkipped {
                    table: label.clone(),
                    count: parsed.skipped_rows,
                });
            }

            report.add_table(
                label,
                TableDetail::new(parsed.row_count(), TableStatus::Ok)
                    .with_fields(parsed.column_count()),
            );
        }

        info!(
            subject = subject_name,
            found = report.found,
            records = report.total_records,
            errors = report.errors.len(),
            "validated sources"
        );

        report
    }

    /// Check a document by itself.
    pub fn validate_document(&self, dataset: &SubjectDataset) -> ValidationReport {
        check_document(&self.registry, dataset)
    }

    /// Load and check a document file.
    ///
    /// A document that is not JSON or lacks a required section fails with
    /// [`GoafError::StructuralInvalid`].
    pub fn validate_document_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(SubjectDataset, ValidationReport)> {
        let dataset = SubjectDataset::load(path)?;
        let report = self.validate_document(&dataset);
        Ok((dataset, report))
    }

    /// Compare freshly counted source records with a document.
    pub fn compare(
        &self,
        subject_name: &str,
        dataset: &SubjectDataset,
        sources: &dyn SourceSet,
    ) -> ValidationReport {
        ReconciliationChecker::new(&self.registry, &self.loader)
            .source_vs_document(subject_name, dataset, sources)
    }

    /// Check a dataset's declared counts against its arrays.
    pub fn consistency(&self, dataset: &SubjectDataset) -> ValidationReport {
        ReconciliationChecker::new(&self.registry, &self.loader).declared_vs_actual(dataset)
    }

    /// Run the source, document, and comparison checks for one subject.
    ///
    /// A structurally invalid document becomes an error in the document
    /// report. The source check still runs and the comparison is skipped.
    pub fn verify(
        &self,
        subject_name: &str,
        document_path: impl AsRef<Path>,
        sources: &dyn SourceSet,
    ) -> Result<Verification> {
        let source = self.validate_sources(subject_name, sources);

        let (document, comparison) = match self.validate_document_file(document_path) {
            Ok((dataset, document)) => {
                let comparison = self.compare(subject_name, &dataset, sources);
                (document, Some(comparison))
            }
            Err(GoafError::StructuralInvalid(reason)) => {
                let mut document =
                    ValidationReport::new(ReportKind::Document).with_subject(subject_name);
                document.record(Finding::StructuralInvalid { reason });
                (document, None)
            }
            Err(e) => return Err(e),
        };

        Ok(Verification {
            source,
            document,
            comparison,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard()
    }
}

/// Combined outcome of [`Validator::verify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub source: ValidationReport,
    pub document: ValidationReport,
    /// Absent when the document could not be read as a dataset.
    pub comparison: Option<ValidationReport>,
}

impl Verification {
    /// True when no report holds an error and the comparison ran.
    pub fn passed(&self) -> bool {
        self.source.is_ok()
            && self.document.is_ok()
            && self.comparison.as_ref().is_some_and(ValidationReport::is_ok)
    }

    /// Render all three reports followed by the overall verdict.
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(80);
        let mut sections = vec![rule.clone(), "Dataset verification".to_string(), rule.clone()];

        sections.push(self.source.render_text());
        sections.push(self.document.render_text());
        if let Some(comparison) = &self.comparison {
            sections.push(comparison.render_text());
        }

        sections.push(rule.clone());
        sections.push(if self.passed() {
            "✅ Verification passed: sources and document agree.".to_string()
        } else {
            "❌ Verification failed: see errors and warnings above.".to_string()
        });
        sections.push(rule);

        sections.join("\n")
    }
}
