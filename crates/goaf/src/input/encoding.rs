//! Encoding resolution for source tables.
//!
//! Survey tables arrive from spreadsheet exports on different systems, so the
//! same table may be UTF-8, UTF-8 with a byte-order mark, or a legacy Chinese
//! code page. Resolution walks a fixed ladder of (encoding, strategy) attempts
//! and stops at the first one that yields a table.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GoafError, Result};

use super::parser::{Parser, ParserConfig};
use super::source::ParsedTable;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A candidate text encoding for source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    /// UTF-8 without a byte-order mark.
    Utf8,
    /// UTF-8 prefixed with a byte-order mark.
    Utf8Bom,
    /// GBK (also covers GB2312 content). One- and two-byte sequences only.
    Gbk,
    /// GB18030, including its four-byte sequences.
    Gb18030,
}

impl SourceEncoding {
    /// Get the conventional label for the encoding.
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Utf8Bom => "utf-8-sig",
            SourceEncoding::Gbk => "gbk",
            SourceEncoding::Gb18030 => "gb18030",
        }
    }

    /// Decode bytes, failing on any malformed sequence.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> std::result::Result<Cow<'a, str>, String> {
        let (encoding, body) = match self {
            SourceEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return Err("byte-order mark present".to_string());
                }
                (encoding_rs::UTF_8, bytes)
            }
            SourceEncoding::Utf8Bom => match bytes.strip_prefix(UTF8_BOM) {
                Some(body) => (encoding_rs::UTF_8, body),
                None => return Err("no byte-order mark".to_string()),
            },
            SourceEncoding::Gbk => {
                // encoding_rs decodes GBK with the full GB18030 table.
                if let Some(offset) = four_byte_offset(bytes) {
                    return Err(format!("four-byte GB18030 sequence at byte {}", offset));
                }
                (encoding_rs::GBK, bytes)
            }
            SourceEncoding::Gb18030 => (encoding_rs::GB18030, bytes),
        };

        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or_else(|| format!("malformed {} byte sequence", self.label()))
    }
}

/// Offset of the first GB18030 four-byte sequence, if any.
///
/// A four-byte sequence is a lead byte in 0x81..=0xFE followed by a digit
/// byte in 0x30..=0x39. GBK has no such sequences.
fn four_byte_offset(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0x81..=0xFE => match bytes.get(i + 1) {
                Some(0x30..=0x39) => return Some(i),
                _ => i += 2,
            },
            _ => i += 1,
        }
    }
    None
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How decoded text is split into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Delimiter and quote aware; any over-wide row fails the table.
    Strict,
    /// Delimiter only; over-wide rows are skipped.
    Lenient,
}

impl ParseStrategy {
    /// Get the label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            ParseStrategy::Strict => "strict",
            ParseStrategy::Lenient => "lenient",
        }
    }
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolution order. Each encoding gets a strict then a lenient attempt
/// before the next encoding is tried.
pub const RESOLUTION_ORDER: [(SourceEncoding, ParseStrategy); 8] = [
    (SourceEncoding::Utf8, ParseStrategy::Strict),
    (SourceEncoding::Utf8, ParseStrategy::Lenient),
    (SourceEncoding::Utf8Bom, ParseStrategy::Strict),
    (SourceEncoding::Utf8Bom, ParseStrategy::Lenient),
    (SourceEncoding::Gbk, ParseStrategy::Strict),
    (SourceEncoding::Gbk, ParseStrategy::Lenient),
    (SourceEncoding::Gb18030, ParseStrategy::Strict),
    (SourceEncoding::Gb18030, ParseStrategy::Lenient),
];

/// One failed resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub encoding: SourceEncoding,
    pub strategy: ParseStrategy,
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.encoding, self.strategy, self.reason)
    }
}

/// Finds the first encoding and strategy that parse the bytes as a table.
#[derive(Debug, Clone, Default)]
pub struct EncodingResolver {
    parser: Parser,
}

impl EncodingResolver {
    /// Create a resolver with the default comma-delimited parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with a custom parser configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            parser: Parser::with_config(config),
        }
    }

    /// Resolve raw bytes into a parsed table.
    ///
    /// Returns [`GoafError::EncodingExhausted`] with every failed attempt when
    /// nothing in [`RESOLUTION_ORDER`] succeeds.
    pub fn resolve(&self, bytes: &[u8]) -> Result<ParsedTable> {
        let mut attempts = Vec::new();
        // Decoding is shared by both strategies of one encoding.
        let mut decoded: Option<(SourceEncoding, std::result::Result<Cow<'_, str>, String>)> = None;

        for (encoding, strategy) in RESOLUTION_ORDER {
            if decoded.as_ref().map(|(e, _)| *e) != Some(encoding) {
                decoded = Some((encoding, encoding.decode(bytes)));
            }

            let outcome = match decoded.as_ref().map(|(_, text)| text) {
                Some(Ok(text)) => self.parser.parse(text, strategy),
                Some(Err(reason)) => Err(reason.clone()),
                None => Err("not decoded".to_string()),
            };

            match outcome {
                Ok(split) => {
                    debug!(
                        encoding = encoding.label(),
                        strategy = strategy.label(),
                        rows = split.rows.len(),
                        skipped = split.skipped_rows,
                        "resolved source table"
                    );
                    return Ok(ParsedTable {
                        headers: split.headers,
                        rows: split.rows,
                        encoding,
                        strategy,
                        skipped_rows: split.skipped_rows,
                    });
                }
                Err(reason) => {
                    trace!(
                        encoding = encoding.label(),
                        strategy = strategy.label(),
                        %reason,
                        "resolution attempt failed"
                    );
                    attempts.push(Attempt {
                        encoding,
                        strategy,
                        reason,
                    });
                }
            }
        }

        Err(GoafError::EncodingExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gbk_bytes(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = encoding_rs::GBK.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_resolve_plain_utf8() {
        let table = EncodingResolver::new()
            .resolve("mine_id,名称\nHX001,河西\n".as_bytes())
            .unwrap();

        assert_eq!(table.encoding, SourceEncoding::Utf8);
        assert_eq!(table.strategy, ParseStrategy::Strict);
        assert_eq!(table.headers, vec!["mine_id", "名称"]);
    }

    #[test]
    fn test_resolve_utf8_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("mine_id,area\nHX001,2\n".as_bytes());

        let table = EncodingResolver::new().resolve(&bytes).unwrap();
        assert_eq!(table.encoding, SourceEncoding::Utf8Bom);
        assert_eq!(table.headers[0], "mine_id");
    }

    #[test]
    fn test_resolve_gbk() {
        let bytes = gbk_bytes("矿井编号,采空区名称\nHX001,一号采空区\n");

        let table = EncodingResolver::new().resolve(&bytes).unwrap();
        assert_eq!(table.encoding, SourceEncoding::Gbk);
        assert_eq!(table.headers, vec!["矿井编号", "采空区名称"]);
        assert_eq!(table.rows[0][1], "一号采空区");
    }

    #[test]
    fn test_resolve_gb18030_four_byte() {
        let (bytes, _, had_errors) = encoding_rs::GB18030.encode("mine_id,name\nHX001,😀é\n");
        assert!(!had_errors);

        let table = EncodingResolver::new().resolve(&bytes).unwrap();
        assert_eq!(table.encoding, SourceEncoding::Gb18030);
        assert_eq!(table.strategy, ParseStrategy::Strict);
        assert_eq!(table.rows[0][1], "😀é");
    }

    #[test]
    fn test_gbk_rejects_four_byte_sequence() {
        let (bytes, _, _) = encoding_rs::GB18030.encode("名称😀");
        let err = SourceEncoding::Gbk.decode(&bytes).unwrap_err();
        assert!(err.contains("four-byte"));
        assert!(SourceEncoding::Gbk.decode(&gbk_bytes("名称")).is_ok());
    }

    #[test]
    fn test_unterminated_quote_falls_back_to_lenient() {
        let table = EncodingResolver::new()
            .resolve(b"mine_id,area\n\"HX001,1\nHX002,2\nHX003,3\n")
            .unwrap();

        assert_eq!(table.encoding, SourceEncoding::Utf8);
        assert_eq!(table.strategy, ParseStrategy::Lenient);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2], vec!["HX003", "3"]);
    }

    #[test]
    fn test_lenient_used_before_next_encoding() {
        let table = EncodingResolver::new()
            .resolve(b"a,b\n1,2\n1,2,3\n")
            .unwrap();

        assert_eq!(table.encoding, SourceEncoding::Utf8);
        assert_eq!(table.strategy, ParseStrategy::Lenient);
        assert_eq!(table.skipped_rows, 1);
    }

    #[test]
    fn test_exhausted_lists_every_attempt() {
        let err = EncodingResolver::new().resolve(b"").unwrap_err();
        match err {
            GoafError::EncodingExhausted { attempts } => {
                assert_eq!(attempts.len(), RESOLUTION_ORDER.len());
                assert_eq!(attempts[0].encoding, SourceEncoding::Utf8);
                assert_eq!(attempts[7].strategy, ParseStrategy::Lenient);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let bytes = gbk_bytes("编号,值\n1,甲\n2,乙\n");
        let resolver = EncodingResolver::new();
        assert_eq!(resolver.resolve(&bytes).unwrap(), resolver.resolve(&bytes).unwrap());
    }
}
