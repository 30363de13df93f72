//! Validation reports and their plain-text rendering.

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::finding::{Finding, Severity};

/// What a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Outcome of assembling a dataset.
    Conversion,
    /// Source tables checked against the schema.
    Source,
    /// A produced document checked on its own.
    Document,
    /// Source record counts against document record counts.
    Comparison,
    /// Declared counts against array lengths within one dataset.
    Consistency,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Conversion => "Conversion",
            ReportKind::Source => "Source tables",
            ReportKind::Document => "Document",
            ReportKind::Comparison => "Source vs document",
            ReportKind::Consistency => "Declared vs actual counts",
        }
    }
}

/// Per-table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Ok,
    Absent,
    Unreadable,
    Mismatch,
}

impl TableStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TableStatus::Ok => "✅",
            TableStatus::Absent => "⚠️",
            TableStatus::Unreadable | TableStatus::Mismatch => "❌",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TableStatus::Ok => "ok",
            TableStatus::Absent => "absent",
            TableStatus::Unreadable => "unreadable",
            TableStatus::Mismatch => "mismatch",
        }
    }
}

/// Detail for one table in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDetail {
    /// Record count (source side for comparisons).
    pub records: usize,
    /// Column count, for reports that read sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<usize>,
    /// Document record count, for comparisons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_records: Option<usize>,
    pub status: TableStatus,
    /// Whether the table itself exists: its source for source and comparison
    /// reports, its array for document and consistency reports.
    pub present: bool,
}

impl TableDetail {
    pub fn new(records: usize, status: TableStatus) -> Self {
        Self {
            records,
            fields: None,
            document_records: None,
            status,
            present: !matches!(status, TableStatus::Absent | TableStatus::Unreadable),
        }
    }

    /// Override presence when the status alone does not tell.
    pub fn with_present(mut self, present: bool) -> Self {
        self.present = present;
        self
    }

    pub fn with_fields(mut self, fields: usize) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_document_records(mut self, records: usize) -> Self {
        self.document_records = Some(records);
        self
    }
}

/// A derived, read-only account of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub kind: ReportKind,
    /// Subject the report is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Tables found (sources present, or document sections present).
    pub found: usize,
    /// Records across all tables.
    pub total_records: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Details keyed by table label, in registry order.
    pub per_table: IndexMap<String, TableDetail>,
}

impl ValidationReport {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            subject: None,
            found: 0,
            total_records: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            per_table: IndexMap::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// File a finding under errors or warnings by its severity.
    pub fn record(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Error => self.errors.push(finding.to_string()),
            Severity::Warning => self.warnings.push(finding.to_string()),
        }
    }

    /// Add a table's detail, counting it toward the totals.
    pub fn add_table(&mut self, table: impl Into<String>, detail: TableDetail) {
        if detail.present {
            self.found += 1;
        }
        self.total_records += detail.records;
        self.per_table.insert(table.into(), detail);
    }

    /// True when no errors were recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render the report as plain text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "-".repeat(80);

        let _ = writeln!(out, "{}", self.kind.title());
        let _ = writeln!(out, "{}", rule);
        if let Some(subject) = &self.subject {
            let _ = writeln!(out, "Subject: {}", subject);
        }
        let _ = writeln!(out, "Tables found: {}/{}", self.found, self.per_table.len());
        let _ = writeln!(out, "Total records: {}", self.total_records);

        for (table, detail) in &self.per_table {
            let _ = write!(out, "  {} {}: {}", detail.status.symbol(), table, detail.records);
            if let Some(document) = detail.document_records {
                let _ = write!(out, " / {}", document);
            }
            if let Some(fields) = detail.fields {
                let _ = write!(out, " ({} fields)", fields);
            }
            let _ = writeln!(out);
        }

        if !self.errors.is_empty() {
            let _ = writeln!(out, "Errors: {}", self.errors.len());
            for error in &self.errors {
                let _ = writeln!(out, "  ❌ {}", error);
            }
        }
        if !self.warnings.is_empty() {
            let _ = writeln!(out, "Warnings: {}", self.warnings.len());
            for warning in &self.warnings {
                let _ = writeln!(out, "  ⚠️ {}", warning);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_routes_by_severity() {
        let mut report = ValidationReport::new(ReportKind::Source);
        report.record(Finding::SourceAbsent {
            table: "采空区积水信息".to_string(),
        });
        report.record(Finding::SourceUnreadable {
            table: "地裂缝信息".to_string(),
            reason: "bad bytes".to_string(),
        });

        assert_eq!(report.warnings, vec!["采空区积水信息: source file not found"]);
        assert_eq!(report.errors, vec!["地裂缝信息: unreadable source (bad bytes)"]);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_add_table_totals() {
        let mut report = ValidationReport::new(ReportKind::Source);
        report.add_table("a", TableDetail::new(3, TableStatus::Ok).with_fields(4));
        report.add_table("b", TableDetail::new(0, TableStatus::Absent));
        report.add_table("c", TableDetail::new(2, TableStatus::Ok));

        assert_eq!(report.found, 2);
        assert_eq!(report.total_records, 5);

        report.add_table(
            "d",
            TableDetail::new(0, TableStatus::Mismatch)
                .with_document_records(4)
                .with_present(false),
        );
        assert_eq!(report.found, 2);
        assert_eq!(report.per_table.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_render() {
        let mut report = ValidationReport::new(ReportKind::Comparison).with_subject("盛博煤矿");
        report.add_table(
            "地裂缝信息",
            TableDetail::new(4, TableStatus::Mismatch).with_document_records(3),
        );
        report.record(Finding::RecordCountMismatch {
            table: "地裂缝信息".to_string(),
            source_records: 4,
            document_records: 3,
        });

        let text = report.render_text();
        assert!(text.starts_with("Source vs document"));
        assert!(text.contains("Subject: 盛博煤矿"));
        assert!(text.contains("❌ 地裂缝信息: 4 / 3"));
        assert!(text.contains("Errors: 1"));
    }

    #[test]
    fn test_serializes_without_empty_options() {
        let mut report = ValidationReport::new(ReportKind::Document);
        report.add_table("t", TableDetail::new(1, TableStatus::Ok));
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["per_table"]["t"].get("fields").is_none());
        assert_eq!(value["per_table"]["t"]["status"], "ok");
    }
}
