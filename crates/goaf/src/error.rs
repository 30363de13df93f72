//! Error types for the goaf library.

use std::path::PathBuf;
use thiserror::Error;

use crate::input::Attempt;

/// Main error type for goaf operations.
#[derive(Debug, Error)]
pub enum GoafError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate encoding and parse strategy failed for a table.
    #[error("unreadable table: tried {} encoding/strategy combinations ({})", .attempts.len(), summarize(.attempts))]
    EncodingExhausted { attempts: Vec<Attempt> },

    /// A document is missing a required top-level section or has the wrong shape.
    #[error("invalid document structure: {0}")]
    StructuralInvalid(String),

    /// The schema resource is absent, unparsable, or incomplete.
    #[error("schema unavailable at '{location}': {reason}")]
    ConfigurationMissing { location: String, reason: String },

    /// An uploaded file name cannot be staged safely.
    #[error("invalid upload name: {0}")]
    InvalidUpload(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GoafError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GoafError::Io {
            path: path.into(),
            source,
        }
    }
}

fn summarize(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for goaf operations.
pub type Result<T> = std::result::Result<T, GoafError>;
