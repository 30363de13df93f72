//! Turns one source table into normalized records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::Result;
use crate::input::{
    is_blank_or_missing, EncodingResolver, ParseStrategy, ParsedTable, ParserConfig,
    SourceEncoding,
};
use crate::registry::LogicalTable;

/// One row of a table: field name to scalar value, in header order.
pub type Record = IndexMap<String, Value>;

/// Where a loaded table came from and how it was decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProvenance {
    /// SHA-256 of the source bytes.
    pub hash: String,
    pub size_bytes: u64,
    pub encoding: SourceEncoding,
    pub strategy: ParseStrategy,
    /// Malformed rows dropped by the lenient strategy.
    pub skipped_rows: usize,
}

/// A table after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    /// Observed columns in header order.
    pub fields: Vec<String>,
    pub records: Vec<Record>,
    pub provenance: SourceProvenance,
}

/// Loads source tables into records.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    resolver: EncodingResolver,
}

impl TableLoader {
    /// Create a loader for comma-delimited sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with a custom parser configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            resolver: EncodingResolver::with_config(config),
        }
    }

    /// Load a table's records.
    pub fn load(&self, table: &LogicalTable, bytes: &[u8]) -> Result<Vec<Record>> {
        Ok(self.load_table(table, bytes)?.records)
    }

    /// Load a table's records together with its columns and provenance.
    pub fn load_table(&self, table: &LogicalTable, bytes: &[u8]) -> Result<LoadedTable> {
        let parsed = self.resolver.resolve(bytes)?;
        let records = to_records(&parsed);

        info!(
            table = %table.external_name,
            rows = records.len(),
            encoding = parsed.encoding.label(),
            strategy = parsed.strategy.label(),
            "loaded table"
        );

        Ok(LoadedTable {
            fields: parsed.headers.clone(),
            records,
            provenance: SourceProvenance {
                hash: hash_bytes(bytes),
                size_bytes: bytes.len() as u64,
                encoding: parsed.encoding,
                strategy: parsed.strategy,
                skipped_rows: parsed.skipped_rows,
            },
        })
    }

    /// Parse without building records.
    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedTable> {
        self.resolver.resolve(bytes)
    }

    /// Number of records [`TableLoader::load`] would produce for these bytes.
    pub fn count_rows(&self, bytes: &[u8]) -> Result<usize> {
        Ok(self.resolver.resolve(bytes)?.row_count())
    }
}

/// Build records from a parsed table.
pub fn to_records(parsed: &ParsedTable) -> Vec<Record> {
    parsed
        .rows
        .iter()
        .map(|row| {
            parsed
                .headers
                .iter()
                .zip(row.iter())
                .map(|(field, cell)| (field.clone(), normalize_cell(cell)))
                .collect()
        })
        .collect()
}

/// Convert one raw cell to a scalar value.
///
/// Missing cells become null. Cells that are entirely numeric become
/// numbers, except integers with leading zeros or beyond the i64 range,
/// which are identifiers and stay strings. Non-finite numerics become null.
pub fn normalize_cell(cell: &str) -> Value {
    if is_blank_or_missing(cell) {
        return Value::Null;
    }

    let trimmed = cell.trim();

    if is_integer_literal(trimmed) {
        if has_leading_zero(trimmed) {
            return Value::String(cell.to_string());
        }
        return match trimmed.parse::<i64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(cell.to_string()),
        };
    }

    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Ok(_) => Value::Null,
        Err(_) => Value::String(cell.to_string()),
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    digits.len() > 1 && digits.starts_with('0')
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}
