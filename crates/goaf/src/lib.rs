//! goaf: converts a mine's goaf census tables into one JSON dataset and checks the result.
//!
//! A subject (one mine) is described by ten delimited-text tables named
//! `{subject}-{table label}.csv`. Conversion decodes each table whatever its
//! encoding (UTF-8, UTF-8 with BOM, GBK, GB18030), turns blank and
//! missing-value cells into null, and merges the tables into one document
//! keyed by stable internal names. Validation checks the sources against the
//! schema and reconciles record counts between sources and document.
//!
//! # Core Principles
//!
//! - **Nothing dropped silently**: every table key is always present, and a
//!   table that cannot be read is reported, never skipped
//! - **Deterministic**: the encoding ladder and table order are fixed lists
//! - **Lossless**: values stay verbatim unless they are missing or numeric
//!
//! # Example
//!
//! ```no_run
//! use goaf::{Converter, Validator};
//!
//! let converter = Converter::new();
//! let assembly = converter.convert_dir("data", "河西联办煤矿");
//! let path = converter.write_document(&assembly, "out").unwrap();
//!
//! let validator = Validator::standard();
//! let sources = converter.sources("data", "河西联办煤矿");
//! let verification = validator.verify("河西联办煤矿", &path, &sources).unwrap();
//! println!("{}", verification.render_text());
//! ```

pub mod assembler;
pub mod dataset;
pub mod error;
pub mod input;
pub mod loader;
pub mod registry;
pub mod schema;
pub mod sources;
pub mod upload;
pub mod validation;

mod converter;

pub use crate::converter::{BatchEntry, BatchSummary, ConvertConfig, Converter, BATCH_SUMMARY_STEM};
pub use assembler::{Assembly, DatasetAssembler, IdentifierRule, TableOutcome};
pub use dataset::{SubjectDataset, SubjectInfo};
pub use error::{GoafError, Result};
pub use input::{EncodingResolver, ParseStrategy, ParsedTable, ParserConfig, SourceEncoding};
pub use loader::{Record, TableLoader};
pub use registry::{LogicalTable, TableRegistry};
pub use schema::Schema;
pub use sources::{MemorySources, SourceDirectory, SourceSet};
pub use upload::UploadSession;
pub use validation::{Finding, Severity, ValidationReport, Validator, Verification};
