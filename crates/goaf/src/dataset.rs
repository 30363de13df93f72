//! The assembled subject dataset and its JSON document form.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GoafError, Result};
use crate::loader::Record;

/// Top-level sections every document must carry.
pub const REQUIRED_SECTIONS: [&str; 3] = ["mine_info", "statistics", "data"];

/// Metadata about the surveyed subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    #[serde(rename = "mine_id", default)]
    pub subject_id: String,
    #[serde(rename = "mine_name", default)]
    pub subject_name: String,
    /// Survey date, when known.
    #[serde(default)]
    pub survey_date: Option<String>,
    #[serde(rename = "standard", default)]
    pub standard_id: String,
    #[serde(rename = "data_version", default)]
    pub schema_version: String,
}

/// One subject's ten tables merged into one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDataset {
    #[serde(rename = "mine_info")]
    pub subject_info: SubjectInfo,
    /// Record count per table, keyed by internal key.
    pub statistics: IndexMap<String, usize>,
    /// Records per table, keyed by internal key.
    #[serde(rename = "data")]
    pub tables: IndexMap<String, Vec<Record>>,
}

impl SubjectDataset {
    /// Total records across all tables.
    pub fn total_records(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Number of tables holding at least one record.
    pub fn populated_tables(&self) -> usize {
        self.tables.values().filter(|records| !records.is_empty()).count()
    }

    /// Records of a table, if the key exists.
    pub fn records(&self, internal_key: &str) -> Option<&[Record]> {
        self.tables.get(internal_key).map(Vec::as_slice)
    }

    /// Build a dataset from a parsed document.
    ///
    /// Fails with [`GoafError::StructuralInvalid`] when a required section is
    /// missing or a section has the wrong shape.
    pub fn from_document(document: Value) -> Result<Self> {
        let object = document.as_object().ok_or_else(|| {
            GoafError::StructuralInvalid("document root is not an object".to_string())
        })?;

        let missing: Vec<&str> = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|section| !object.contains_key(*section))
            .collect();
        if !missing.is_empty() {
            return Err(GoafError::StructuralInvalid(format!(
                "missing top-level section(s): {}",
                missing.join(", ")
            )));
        }

        serde_json::from_value(document)
            .map_err(|e| GoafError::StructuralInvalid(format!("malformed section: {}", e)))
    }

    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| GoafError::StructuralInvalid(format!("not valid JSON: {}", e)))?;
        Self::from_document(document)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the dataset as a JSON document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| GoafError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| GoafError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;

        Ok(())
    }

    /// Load a dataset from a JSON document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GoafError::io(path, e))?;
        let reader = BufReader::new(file);
        let document: Value = serde_json::from_reader(reader)
            .map_err(|e| GoafError::StructuralInvalid(format!("not valid JSON: {}", e)))?;
        Self::from_document(document)
    }
}
