//! Findings raised while converting and checking a subject.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A condition found in a source table or document.
///
/// Tables are named by their source label. The `Display` text is the
/// message that lands in a report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Finding {
    #[error("{table}: source file not found")]
    SourceAbsent { table: String },

    #[error("{table}: unreadable source ({reason})")]
    SourceUnreadable { table: String, reason: String },

    #[error("{table}: {count} malformed row(s) skipped")]
    RowsSkipped { table: String, count: usize },

    #[error("{table}: missing fields [{}]", .fields.join(", "))]
    MissingFields { table: String, fields: Vec<String> },

    #[error("{table}: unexpected fields [{}]", .fields.join(", "))]
    ExtraFields { table: String, fields: Vec<String> },

    #[error("{table}: source has {source_records} record(s), document has {document_records}")]
    RecordCountMismatch {
        table: String,
        source_records: usize,
        document_records: usize,
    },

    #[error("{table}: statistics declares {declared} record(s), data holds {actual}")]
    DeclaredCountMismatch {
        table: String,
        declared: usize,
        actual: usize,
    },

    #[error("{table}: data holds {actual} record(s) with no declared count")]
    UndeclaredTable { table: String, actual: usize },

    #[error("{table}: declared count {declared} with no data section")]
    UndocumentedTable { table: String, declared: usize },

    #[error("{table}: table missing from document")]
    TableAbsentFromDocument { table: String },

    #[error("{key}: unknown table key in document")]
    UnknownTableKey { key: String },

    #[error("{table}: {count} cell(s) hold blank or missing-value text instead of null")]
    UnnormalizedMissing { table: String, count: usize },

    #[error("document has an empty mine_id")]
    EmptySubjectId,

    #[error("document data version {found} differs from schema version {expected}")]
    SchemaVersionMismatch { found: String, expected: String },

    #[error("document belongs to '{document}', sources belong to '{sources}'")]
    SubjectMismatch { document: String, sources: String },

    #[error("document structure invalid: {reason}")]
    StructuralInvalid { reason: String },
}

impl Finding {
    /// Severity of this finding.
    pub fn severity(&self) -> Severity {
        match self {
            Finding::SourceAbsent { .. }
            | Finding::RowsSkipped { .. }
            | Finding::MissingFields { .. }
            | Finding::ExtraFields { .. }
            | Finding::TableAbsentFromDocument { .. }
            | Finding::UnknownTableKey { .. }
            | Finding::SchemaVersionMismatch { .. }
            | Finding::SubjectMismatch { .. } => Severity::Warning,
            Finding::SourceUnreadable { .. }
            | Finding::RecordCountMismatch { .. }
            | Finding::DeclaredCountMismatch { .. }
            | Finding::UndeclaredTable { .. }
            | Finding::UndocumentedTable { .. }
            | Finding::UnnormalizedMissing { .. }
            | Finding::EmptySubjectId
            | Finding::StructuralInvalid { .. } => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let finding = Finding::MissingFields {
            table: "采空区积水信息".to_string(),
            fields: vec!["water_volume".to_string(), "water_area".to_string()],
        };
        assert_eq!(
            finding.to_string(),
            "采空区积水信息: missing fields [water_volume, water_area]"
        );

        let finding = Finding::RecordCountMismatch {
            table: "地裂缝信息".to_string(),
            source_records: 4,
            document_records: 3,
        };
        assert_eq!(
            finding.to_string(),
            "地裂缝信息: source has 4 record(s), document has 3"
        );
    }

    #[test]
    fn test_field_mismatch_is_warning() {
        let finding = Finding::ExtraFields {
            table: "t".to_string(),
            fields: vec!["x".to_string()],
        };
        assert_eq!(finding.severity(), Severity::Warning);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let finding = Finding::DeclaredCountMismatch {
            table: "t".to_string(),
            declared: 2,
            actual: 1,
        };
        assert_eq!(finding.severity(), Severity::Error);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }
}
