//! Parsed table representation and the missing-value predicate.

use serde::{Deserialize, Serialize};

use super::encoding::{ParseStrategy, SourceEncoding};

/// Cell spellings that mean "no value" in survey exports.
///
/// Compared case-sensitively against the trimmed cell, matching the
/// spellings spreadsheet tools and pandas-based exporters write out.
pub const MISSING_SENTINELS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw cell represents a missing value.
///
/// Empty, whitespace-only and sentinel cells are all missing.
pub fn is_blank_or_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || MISSING_SENTINELS.contains(&trimmed)
}

/// A delimited table decoded and split into rows, before value normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Column headers, de-duplicated, in file order.
    pub headers: Vec<String>,
    /// Row data as raw strings, each padded to the header width.
    pub rows: Vec<Vec<String>>,
    /// Encoding that decoded the bytes.
    pub encoding: SourceEncoding,
    /// Strategy that split the text.
    pub strategy: ParseStrategy,
    /// Malformed rows dropped by the lenient strategy.
    pub skipped_rows: usize,
}

impl ParsedTable {
    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
