//! Schema definition types and loading.

use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{GoafError, Result};

/// The census schema shipped with the crate.
pub const EMBEDDED_SCHEMA: &str = include_str!("../../schema/goaf_schema.json");

/// A field expected in a source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Column name as it appears in the source header.
    pub name: String,
    /// Declared value type (string, number, date).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Measurement unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Whether the standard marks the field as mandatory.
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One table of the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Stable identifier (T01..T10).
    pub table_id: String,
    /// Label used in source file names.
    pub table_name: String,
    /// Key used in produced documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declared order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl TableDefinition {
    /// Field names in declared order.
    pub fn field_names(&self) -> IndexSet<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// The full census schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Version of the dataset format this schema describes.
    pub schema_version: String,
    /// Identifier of the survey standard.
    pub standard: String,
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    /// The schema compiled into the crate.
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_SCHEMA, "<embedded>").expect("embedded schema is valid JSON")
    }

    /// Parse a schema from JSON text. `location` names the source in errors.
    pub fn from_json(text: &str, location: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GoafError::ConfigurationMissing {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GoafError::ConfigurationMissing {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// Find a table by its identifier.
    pub fn table(&self, table_id: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.table_id == table_id)
    }
}
