//! Converter: the configured entry point for turning source tables into documents.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::assembler::{Assembly, DatasetAssembler, IdentifierRule};
use crate::error::{GoafError, Result};
use crate::input::ParserConfig;
use crate::loader::TableLoader;
use crate::registry::TableRegistry;
use crate::schema::Schema;
use crate::sources::{discover_subjects, SourceDirectory, SourceSet};

/// File stem of the batch summary written next to the documents.
pub const BATCH_SUMMARY_STEM: &str = "conversion_summary";

/// Configuration for conversion.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Source file extension, without the dot.
    pub extension: String,
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Label in document file names: `{subject}-{label}.json`.
    pub document_label: String,
    /// Subject identifier lookup and fallback.
    pub identifier: IdentifierRule,
    /// Survey date recorded in every document, if known.
    pub survey_date: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
            parser: ParserConfig::default(),
            document_label: "采空区数据集".to_string(),
            identifier: IdentifierRule::default(),
            survey_date: None,
        }
    }
}

/// Converts subjects' source tables into documents.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConvertConfig,
    registry: TableRegistry,
    loader: TableLoader,
}

impl Converter {
    /// Create a converter over the embedded schema.
    pub fn new() -> Self {
        Self::with_config(ConvertConfig::default())
    }

    /// Create a converter with custom configuration.
    pub fn with_config(config: ConvertConfig) -> Self {
        let loader = TableLoader::with_config(config.parser.clone());
        Self {
            config,
            registry: TableRegistry::standard().clone(),
            loader,
        }
    }

    /// Use the tables of another schema.
    pub fn with_schema(mut self, schema: &Schema) -> Result<Self> {
        self.registry = TableRegistry::from_schema(schema)?;
        Ok(self)
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Convert one subject from any source set.
    pub fn convert(&self, subject_name: &str, sources: &dyn SourceSet) -> Assembly {
        DatasetAssembler::new(&self.registry, &self.loader)
            .with_identifier(self.config.identifier.clone())
            .with_survey_date(self.config.survey_date.clone())
            .assemble(subject_name, sources)
    }

    /// Convert one subject whose files sit in a directory.
    pub fn convert_dir(&self, dir: impl AsRef<Path>, subject_name: &str) -> Assembly {
        self.convert(subject_name, &self.sources(dir, subject_name))
    }

    /// Source set for a subject in a directory, using the configured extension.
    pub fn sources(&self, dir: impl AsRef<Path>, subject_name: &str) -> SourceDirectory {
        SourceDirectory::new(dir.as_ref(), subject_name, self.config.extension.as_str())
    }

    /// Subjects with at least one source file in a directory.
    pub fn discover(&self, dir: impl AsRef<Path>) -> Result<Vec<String>> {
        discover_subjects(dir, &self.registry, &self.config.extension)
    }

    /// Document file name for a subject.
    pub fn document_name(&self, subject_name: &str) -> String {
        format!("{}-{}.json", subject_name, self.config.document_label)
    }

    /// Write an assembly's dataset into a directory, returning the path.
    pub fn write_document(&self, assembly: &Assembly, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = output_dir
            .as_ref()
            .join(self.document_name(&assembly.dataset.subject_info.subject_name));
        assembly.dataset.save(&path)?;
        info!(path = %path.display(), "wrote document");
        Ok(path)
    }

    /// Convert many subjects in sequence and write a summary.
    ///
    /// With no subjects given, every subject discovered in `dir` is
    /// converted. A subject whose document cannot be written is recorded as
    /// failed and the batch continues.
    pub fn batch_convert(
        &self,
        dir: impl AsRef<Path>,
        subjects: Option<&[String]>,
        output_dir: impl AsRef<Path>,
    ) -> Result<BatchSummary> {
        let dir = dir.as_ref();
        let output_dir = output_dir.as_ref();

        let subjects = match subjects {
            Some(subjects) => subjects.to_vec(),
            None => self.discover(dir)?,
        };
        info!(count = subjects.len(), dir = %dir.display(), "batch conversion");

        fs::create_dir_all(output_dir).map_err(|e| GoafError::io(output_dir, e))?;

        let mut summary = BatchSummary::new();
        for subject in &subjects {
            let assembly = self.convert_dir(dir, subject);
            let report = assembly.report();
            let written = self.write_document(&assembly, output_dir);

            let entry = match written {
                Ok(path) => BatchEntry {
                    subject: subject.clone(),
                    subject_id: Some(assembly.dataset.subject_info.subject_id.clone()),
                    document: Some(path),
                    tables: assembly.dataset.populated_tables(),
                    records: assembly.dataset.total_records(),
                    errors: report.errors,
                    warnings: report.warnings,
                    failure: None,
                },
                Err(e) => {
                    error!(subject = %subject, error = %e, "conversion failed");
                    BatchEntry {
                        subject: subject.clone(),
                        subject_id: None,
                        document: None,
                        tables: 0,
                        records: 0,
                        errors: report.errors,
                        warnings: report.warnings,
                        failure: Some(e.to_string()),
                    }
                }
            };
            summary.entries.push(entry);
        }

        summary.write(output_dir, self.registry.len())?;
        Ok(summary)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Result for one subject in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub subject: String,
    pub subject_id: Option<String>,
    /// Path of the written document.
    pub document: Option<PathBuf>,
    /// Tables holding at least one record.
    pub tables: usize,
    pub records: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Why no document was written.
    pub failure: Option<String>,
}

impl BatchEntry {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Summary of a batch conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn total_records(&self) -> usize {
        self.entries.iter().map(|e| e.records).sum()
    }

    /// True when every subject was written without a table error.
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.succeeded() && e.errors.is_empty())
    }

    /// Plain-text rendering; `table_count` is the number of registry tables.
    pub fn render_text(&self, table_count: usize) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Batch conversion summary");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Generated: {}", self.generated_at.to_rfc3339());
        let _ = writeln!(out, "Subjects: {}", self.entries.len());
        let _ = writeln!(out, "Succeeded: {}", self.succeeded());
        let _ = writeln!(out, "Failed: {}", self.failed());
        let _ = writeln!(out, "Total records: {}", self.total_records());
        let _ = writeln!(out, "{}", "-".repeat(80));

        for entry in &self.entries {
            match &entry.failure {
                None => {
                    let _ = writeln!(out, "✅ {}", entry.subject);
                    let _ = writeln!(out, "   Records: {}", entry.records);
                    let _ = writeln!(out, "   Tables: {}/{}", entry.tables, table_count);
                    if let Some(document) = &entry.document {
                        let _ = writeln!(out, "   File: {}", document.display());
                    }
                    for error in &entry.errors {
                        let _ = writeln!(out, "   ❌ {}", error);
                    }
                }
                Some(failure) => {
                    let _ = writeln!(out, "❌ {}", entry.subject);
                    let _ = writeln!(out, "   Error: {}", failure);
                }
            }
        }

        out
    }

    /// Write the summary as JSON and as text into a directory.
    pub fn write(&self, output_dir: impl AsRef<Path>, table_count: usize) -> Result<()> {
        let output_dir = output_dir.as_ref();

        let json_path = output_dir.join(format!("{}.json", BATCH_SUMMARY_STEM));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&json_path, json).map_err(|e| GoafError::io(&json_path, e))?;

        let text_path = output_dir.join(format!("{}.txt", BATCH_SUMMARY_STEM));
        fs::write(&text_path, self.render_text(table_count))
            .map_err(|e| GoafError::io(&text_path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySources;
    use tempfile::TempDir;

    #[test]
    fn test_document_name() {
        let converter = Converter::new();
        assert_eq!(converter.document_name("盛博煤矿"), "盛博煤矿-采空区数据集.json");
    }

    #[test]
    fn test_convert_memory() {
        let converter = Converter::new();
        let sources = MemorySources::new().with("T01", "mine_id,area\nSB001,12.5\n");
        let assembly = converter.convert("盛博煤矿", &sources);
        assert_eq!(assembly.dataset.subject_info.subject_id, "SB001");
        assert_eq!(assembly.dataset.total_records(), 1);
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("盛博煤矿-地裂缝信息.txt"), "mine_id\nSB001\n").unwrap();

        let converter = Converter::with_config(ConvertConfig {
            extension: "txt".to_string(),
            ..Default::default()
        });
        assert_eq!(converter.discover(dir.path()).unwrap(), vec!["盛博煤矿".to_string()]);
        let assembly = converter.convert_dir(dir.path(), "盛博煤矿");
        assert_eq!(assembly.dataset.statistics["crack_info"], 1);
    }

    #[test]
    fn test_summary_text() {
        let mut summary = BatchSummary::new();
        summary.entries.push(BatchEntry {
            subject: "盛博煤矿".to_string(),
            subject_id: Some("SB001".to_string()),
            document: Some(PathBuf::from("out/盛博煤矿-采空区数据集.json")),
            tables: 2,
            records: 7,
            errors: Vec::new(),
            warnings: Vec::new(),
            failure: None,
        });
        summary.entries.push(BatchEntry {
            subject: "河西联办煤矿".to_string(),
            subject_id: None,
            document: None,
            tables: 0,
            records: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            failure: Some("disk full".to_string()),
        });

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_clean());

        let text = summary.render_text(10);
        assert!(text.contains("Tables: 2/10"));
        assert!(text.contains("❌ 河西联办煤矿"));
        assert!(text.contains("Error: disk full"));
    }
}
