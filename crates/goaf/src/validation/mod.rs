//! Checks on source tables and produced documents.
//!
//! Field mismatches and absent tables are warnings. Record-count
//! disagreements and unreadable sources are errors.

mod document;
mod fields;
mod finding;
mod reconcile;
mod report;
mod validator;

pub use document::check_document;
pub use fields::{check_fields, FieldCheck};
pub use finding::{Finding, Severity};
pub use reconcile::ReconciliationChecker;
pub use report::{ReportKind, TableDetail, TableStatus, ValidationReport};
pub use validator::{Validator, Verification};
