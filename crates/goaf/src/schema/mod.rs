//! Schema resource describing the ten census tables and their fields.

mod definition;

pub use definition::{FieldDefinition, Schema, TableDefinition, EMBEDDED_SCHEMA};
