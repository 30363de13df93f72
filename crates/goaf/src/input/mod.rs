//! Source decoding and parsing.

mod encoding;
mod parser;
mod source;

pub use encoding::{Attempt, EncodingResolver, ParseStrategy, SourceEncoding, RESOLUTION_ORDER};
pub use parser::{Parser, ParserConfig, SplitTable};
pub use source::{is_blank_or_missing, ParsedTable, MISSING_SENTINELS};
