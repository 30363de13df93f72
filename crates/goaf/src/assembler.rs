//! Merges a subject's ten tables into one dataset.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::dataset::{SubjectDataset, SubjectInfo};
use crate::loader::{Record, SourceProvenance, TableLoader};
use crate::registry::TableRegistry;
use crate::sources::SourceSet;
use crate::validation::{check_fields, FieldCheck, Finding, ReportKind, TableDetail, TableStatus, ValidationReport};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").expect("valid regex"));

/// How a subject's identifier is found and, failing that, derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRule {
    /// Field holding the identifier in source tables.
    pub field: String,
    /// Characters of the subject name kept by the fallback.
    pub prefix_len: usize,
    /// Appended by the fallback.
    pub suffix: String,
}

impl Default for IdentifierRule {
    fn default() -> Self {
        Self {
            field: "mine_id".to_string(),
            prefix_len: 6,
            suffix: "001".to_string(),
        }
    }
}

impl IdentifierRule {
    /// Identifier derived from the subject name alone.
    ///
    /// Non-word characters are removed, the first `prefix_len` characters
    /// kept and uppercased, then the suffix appended.
    pub fn fallback(&self, subject_name: &str) -> String {
        let stripped = NON_WORD.replace_all(subject_name, "");
        let prefix: String = stripped.chars().take(self.prefix_len).collect();
        format!("{}{}", prefix.to_uppercase(), self.suffix)
    }

    /// First populated identifier across tables, in the order given.
    pub fn resolve<'r>(&self, tables: impl IntoIterator<Item = &'r [Record]>) -> Option<String> {
        tables.into_iter().find_map(|records| {
            records
                .iter()
                .find_map(|record| record.get(&self.field).and_then(render_identifier))
        })
    }
}

/// Text form of an identifier cell. Whole numbers print without a fraction.
fn render_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{:.0}", f)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// What happened to one table during assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TableOutcome {
    Loaded {
        rows: usize,
        fields: Vec<String>,
        field_check: FieldCheck,
        provenance: SourceProvenance,
    },
    Absent {
        location: String,
    },
    Unreadable {
        location: String,
        reason: String,
    },
}

/// A dataset together with how each table was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub dataset: SubjectDataset,
    /// Outcome per table, keyed by source label, in registry order.
    pub outcomes: IndexMap<String, TableOutcome>,
}

impl Assembly {
    /// True when some table could not be read.
    pub fn has_errors(&self) -> bool {
        self.outcomes
            .values()
            .any(|o| matches!(o, TableOutcome::Unreadable { .. }))
    }

    /// Conversion report: absent tables and field mismatches are warnings,
    /// unreadable tables are errors.
    pub fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new(ReportKind::Conversion)
            .with_subject(self.dataset.subject_info.subject_name.clone());

        for (label, outcome) in &self.outcomes {
            let detail = match outcome {
                TableOutcome::Loaded {
                    rows,
                    fields,
                    field_check,
                    provenance,
                } => {
                    for finding in field_check.findings(label) {
                        report.record(finding);
                    }
                    if provenance.skipped_rows > 0 {
                        report.record(Finding::RowsSkipped {
                            table: label.clone(),
                            count: provenance.skipped_rows,
                        });
                    }
                    TableDetail::new(*rows, TableStatus::Ok).with_fields(fields.len())
                }
                TableOutcome::Absent { .. } => {
                    report.record(Finding::SourceAbsent { table: label.clone() });
                    TableDetail::new(0, TableStatus::Absent)
                }
                TableOutcome::Unreadable { reason, .. } => {
                    report.record(Finding::SourceUnreadable {
                        table: label.clone(),
                        reason: reason.clone(),
                    });
                    TableDetail::new(0, TableStatus::Unreadable)
                }
            };
            report.add_table(label.clone(), detail);
        }

        report
    }
}

/// Builds a [`SubjectDataset`] from a subject's source tables.
#[derive(Debug, Clone)]
pub struct DatasetAssembler<'a> {
    registry: &'a TableRegistry,
    loader: &'a TableLoader,
    identifier: IdentifierRule,
    survey_date: Option<String>,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(registry: &'a TableRegistry, loader: &'a TableLoader) -> Self {
        Self {
            registry,
            loader,
            identifier: IdentifierRule::default(),
            survey_date: None,
        }
    }

    pub fn with_identifier(mut self, identifier: IdentifierRule) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn with_survey_date(mut self, survey_date: Option<String>) -> Self {
        self.survey_date = survey_date;
        self
    }

    /// Load every table of a subject and merge them.
    ///
    /// A table that is absent or fails to load becomes an empty array; the
    /// other tables are unaffected. All registry keys are always present.
    pub fn assemble(&self, subject_name: &str, sources: &dyn SourceSet) -> Assembly {
        let mut tables = IndexMap::with_capacity(self.registry.len());
        let mut outcomes = IndexMap::with_capacity(self.registry.len());

        for table in self.registry.tables() {
            let location = sources.describe(table);

            let (records, outcome) = match sources.fetch(table) {
                Ok(Some(bytes)) => match self.loader.load_table(table, &bytes) {
                    Ok(loaded) => {
                        let field_check = check_fields(table, loaded.fields.as_slice());
                        let outcome = TableOutcome::Loaded {
                            rows: loaded.records.len(),
                            fields: loaded.fields,
                            field_check,
                            provenance: loaded.provenance,
                        };
                        (loaded.records, outcome)
                    }
                    Err(e) => {
                        warn!(table = %table.external_name, %location, error = %e, "table unreadable");
                        let reason = e.to_string();
                        (Vec::new(), TableOutcome::Unreadable { location, reason })
                    }
                },
                Ok(None) => {
                    warn!(table = %table.external_name, %location, "table absent");
                    (Vec::new(), TableOutcome::Absent { location })
                }
                Err(e) => {
                    warn!(table = %table.external_name, %location, error = %e, "table unreadable");
                    let reason = e.to_string();
                    (Vec::new(), TableOutcome::Unreadable { location, reason })
                }
            };

            tables.insert(table.internal_key.clone(), records);
            outcomes.insert(table.external_name.clone(), outcome);
        }

        // Resolved after all loads, walking the declared order.
        let subject_id = self
            .identifier
            .resolve(self.registry.tables().iter().filter_map(|t| {
                tables.get(&t.internal_key).map(Vec::as_slice)
            }))
            .unwrap_or_else(|| self.identifier.fallback(subject_name));

        let statistics: IndexMap<String, usize> = tables
            .iter()
            .map(|(key, records)| (key.clone(), records.len()))
            .collect();

        let dataset = SubjectDataset {
            subject_info: SubjectInfo {
                subject_id,
                subject_name: subject_name.to_string(),
                survey_date: self.survey_date.clone(),
                standard_id: self.registry.standard_id().to_string(),
                schema_version: self.registry.schema_version().to_string(),
            },
            statistics,
            tables,
        };

        info!(
            subject = subject_name,
            id = %dataset.subject_info.subject_id,
            tables = dataset.populated_tables(),
            records = dataset.total_records(),
            "assembled dataset"
        );

        Assembly { dataset, outcomes }
    }
}
