//! Expected-field checks for source tables.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::finding::Finding;
use crate::registry::LogicalTable;

/// Set difference between a table's expected fields and its observed columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    /// Expected but not observed, in schema order.
    pub missing: IndexSet<String>,
    /// Observed but not expected, in header order.
    pub extra: IndexSet<String>,
}

impl FieldCheck {
    /// True when the observed columns match the schema exactly (order aside).
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// Findings for this check, named by the table's source label.
    pub fn findings(&self, table: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        if !self.missing.is_empty() {
            findings.push(Finding::MissingFields {
                table: table.to_string(),
                fields: self.missing.iter().cloned().collect(),
            });
        }
        if !self.extra.is_empty() {
            findings.push(Finding::ExtraFields {
                table: table.to_string(),
                fields: self.extra.iter().cloned().collect(),
            });
        }
        findings
    }
}

/// Compare a table's expected fields with the columns actually present.
pub fn check_fields<S: AsRef<str>>(table: &LogicalTable, observed: &[S]) -> FieldCheck {
    let observed: IndexSet<&str> = observed.iter().map(AsRef::as_ref).collect();

    let missing = table
        .expected_fields
        .iter()
        .filter(|field| !observed.contains(field.as_str()))
        .cloned()
        .collect();

    let extra = observed
        .iter()
        .filter(|field| !table.expected_fields.contains(**field))
        .map(|field| field.to_string())
        .collect();

    FieldCheck { missing, extra }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TableRegistry;

    fn water_table() -> &'static LogicalTable {
        TableRegistry::standard().find("goaf_water_info").unwrap()
    }

    #[test]
    fn test_exact_match_is_clean() {
        let table = water_table();
        let observed: Vec<&str> = table.expected_fields.iter().map(String::as_str).collect();
        assert!(check_fields(table, &observed).is_clean());
    }

    #[test]
    fn test_renamed_field() {
        let table = water_table();
        let observed: Vec<String> = table
            .expected_fields
            .iter()
            .map(|f| if f == "water_area" { "water_area_m2".to_string() } else { f.clone() })
            .collect();

        let check = check_fields(table, &observed);
        assert_eq!(check.missing.iter().collect::<Vec<_>>(), vec!["water_area"]);
        assert_eq!(check.extra.iter().collect::<Vec<_>>(), vec!["water_area_m2"]);

        let findings = check.findings(&table.external_name);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].to_string().contains("water_area"));
    }

    #[test]
    fn test_extra_columns_from_str_slice() {
        let table = water_table();
        let mut observed: Vec<&str> = table.expected_fields.iter().map(String::as_str).collect();
        observed.push("surveyor");

        let check = check_fields(table, observed.as_slice());
        assert!(check.missing.is_empty());
        assert_eq!(check.extra.iter().collect::<Vec<_>>(), vec!["surveyor"]);
    }

    #[test]
    fn test_order_does_not_matter() {
        let table = water_table();
        let mut observed: Vec<&str> = table.expected_fields.iter().map(String::as_str).collect();
        observed.reverse();
        assert!(check_fields(table, &observed).is_clean());
    }
}
