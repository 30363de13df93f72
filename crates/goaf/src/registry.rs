//! The ten logical census tables and their fixed order.
//!
//! Order matters: the subject identifier is taken from the first table, in
//! this order, that supplies one. Lookups never depend on map iteration.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{GoafError, Result};
use crate::schema::Schema;

/// Static naming of one logical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableName {
    pub table_id: &'static str,
    /// Label used in source file names.
    pub external_name: &'static str,
    /// Key used in produced documents.
    pub internal_key: &'static str,
}

/// The census tables in declared order.
pub const STANDARD_TABLES: [TableName; 10] = [
    TableName {
        table_id: "T01",
        external_name: "采空区基本信息",
        internal_key: "goaf_basic_info",
    },
    TableName {
        table_id: "T02",
        external_name: "采空区积水信息",
        internal_key: "goaf_water_info",
    },
    TableName {
        table_id: "T03",
        external_name: "采空区积气信息",
        internal_key: "goaf_gas_info",
    },
    TableName {
        table_id: "T04",
        external_name: "自燃发火信息",
        internal_key: "fire_info",
    },
    TableName {
        table_id: "T05",
        external_name: "采空区悬顶信息",
        internal_key: "suspended_roof_info",
    },
    TableName {
        table_id: "T06",
        external_name: "采空区塌陷信息",
        internal_key: "collapse_info",
    },
    TableName {
        table_id: "T07",
        external_name: "地裂缝信息",
        internal_key: "crack_info",
    },
    TableName {
        table_id: "T08",
        external_name: "废弃井筒信息",
        internal_key: "abandoned_shaft_info",
    },
    TableName {
        table_id: "T09",
        external_name: "密闭墙信息",
        internal_key: "seal_wall_info",
    },
    TableName {
        table_id: "T10",
        external_name: "采空区治理信息",
        internal_key: "treatment_info",
    },
];

/// A logical table with the fields the schema expects in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalTable {
    pub table_id: String,
    pub external_name: String,
    pub internal_key: String,
    pub expected_fields: IndexSet<String>,
}

impl LogicalTable {
    /// Source file name for a subject, e.g. `河西煤矿-采空区积水信息.csv`.
    pub fn file_name(&self, subject_name: &str, extension: &str) -> String {
        format!("{}-{}.{}", subject_name, self.external_name, extension)
    }
}

static STANDARD: Lazy<TableRegistry> = Lazy::new(|| {
    TableRegistry::from_schema(&Schema::embedded()).expect("embedded schema covers all tables")
});

/// Read-only, ordered set of the ten logical tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegistry {
    tables: Vec<LogicalTable>,
    schema_version: String,
    standard: String,
}

impl TableRegistry {
    /// Registry built from the embedded schema, created once per process.
    pub fn standard() -> &'static TableRegistry {
        &STANDARD
    }

    /// Build the registry from a schema.
    ///
    /// Every table in [`STANDARD_TABLES`] must be present in the schema under
    /// the same identifier and source label, otherwise the schema is rejected.
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        let mut tables = Vec::with_capacity(STANDARD_TABLES.len());

        for name in &STANDARD_TABLES {
            let definition = schema.table(name.table_id).ok_or_else(|| {
                GoafError::ConfigurationMissing {
                    location: "schema".to_string(),
                    reason: format!("table {} ({}) is not defined", name.table_id, name.external_name),
                }
            })?;

            if definition.table_name != name.external_name {
                return Err(GoafError::ConfigurationMissing {
                    location: "schema".to_string(),
                    reason: format!(
                        "table {} is labelled '{}', expected '{}'",
                        name.table_id, definition.table_name, name.external_name
                    ),
                });
            }

            if let Some(key) = &definition.internal_key {
                if key != name.internal_key {
                    return Err(GoafError::ConfigurationMissing {
                        location: "schema".to_string(),
                        reason: format!(
                            "table {} has internal key '{}', expected '{}'",
                            name.table_id, key, name.internal_key
                        ),
                    });
                }
            }

            tables.push(LogicalTable {
                table_id: name.table_id.to_string(),
                external_name: name.external_name.to_string(),
                internal_key: name.internal_key.to_string(),
                expected_fields: definition.field_names(),
            });
        }

        Ok(Self {
            tables,
            schema_version: schema.schema_version.clone(),
            standard: schema.standard.clone(),
        })
    }

    /// Tables in declared order.
    pub fn tables(&self) -> &[LogicalTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn standard_id(&self) -> &str {
        &self.standard
    }

    /// Find a table by identifier, source label, or document key.
    pub fn find(&self, name: &str) -> Option<&LogicalTable> {
        self.tables
            .iter()
            .find(|t| t.table_id == name || t.external_name == name || t.internal_key == name)
    }

    /// Internal keys in declared order.
    pub fn internal_keys(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.internal_key.as_str())
    }
}
