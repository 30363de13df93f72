//! Delimited-text parser with strict and lenient strategies.

use std::collections::HashSet;

use super::encoding::ParseStrategy;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Quote character (honored by the strict strategy only).
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// Rows split out of decoded text.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub skipped_rows: usize,
}

/// Splits decoded text into a header and rows.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse text with the given strategy.
    ///
    /// The strict strategy honors quoting and rejects the whole table when a
    /// row is wider than the header or a quoted field never closes. The lenient strategy splits on the
    /// delimiter only and skips rows it cannot place. Both pad short rows
    /// with empty cells and ignore blank lines.
    pub fn parse(&self, text: &str, strategy: ParseStrategy) -> Result<SplitTable, String> {
        let strict = strategy == ParseStrategy::Strict;
        if strict && has_unterminated_quote(text, self.config.delimiter, self.config.quote) {
            return Err("unterminated quoted field".to_string());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(self.config.quote)
            .quoting(strict)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let raw_headers: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|s| s.to_string())
            .collect();

        if raw_headers.is_empty() {
            return Err("no header row".to_string());
        }

        let headers = dedupe_headers(&raw_headers);
        let expected_cols = headers.len();

        let mut rows = Vec::new();
        let mut skipped_rows = 0;

        for (row_idx, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if strict => return Err(format!("row {}: {}", row_idx + 1, e)),
                Err(_) => {
                    skipped_rows += 1;
                    continue;
                }
            };

            if record.len() > expected_cols {
                if strict {
                    return Err(format!(
                        "row {} has {} fields, header has {}",
                        row_idx + 1,
                        record.len(),
                        expected_cols
                    ));
                }
                skipped_rows += 1;
                continue;
            }

            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            // Pad row if needed
            while row.len() < expected_cols {
                row.push(String::new());
            }

            rows.push(row);
        }

        Ok(SplitTable {
            headers,
            rows,
            skipped_rows,
        })
    }
}

/// True when a field opens with a quote that is never closed.
///
/// The csv reader accepts end of input inside a quoted field and folds every
/// following line into that field.
fn has_unterminated_quote(text: &str, delimiter: u8, quote: u8) -> bool {
    let bytes = text.as_bytes();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == quote {
                // A doubled quote is an escaped quote character.
                if bytes.get(i + 1) == Some(&quote) {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else if field_start && b == quote {
            in_quotes = true;
        }

        if !in_quotes {
            field_start = b == delimiter || b == b'\n' || b == b'\r';
        }
        i += 1;
    }

    in_quotes
}

/// Trim header names, name blank headers by position and suffix repeats.
///
/// `a, a, a` becomes `a, a.1, a.2` so that no column is folded into another.
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (index, name) in raw.iter().enumerate() {
        let name = name.trim();
        let base = if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
