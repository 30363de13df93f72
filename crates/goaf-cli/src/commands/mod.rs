//! CLI command implementations.

pub mod convert;
pub mod convert_all;
pub mod discover;
pub mod validate;

use std::path::PathBuf;

use goaf::{ConvertConfig, Converter, Schema, Validator};

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub data_dir: PathBuf,
    pub schema: Option<PathBuf>,
    pub extension: String,
}

impl Context {
    /// Converter using the chosen schema and extension.
    pub fn converter(&self, survey_date: Option<String>) -> Result<Converter, Box<dyn std::error::Error>> {
        let converter = Converter::with_config(ConvertConfig {
            extension: self.extension.clone(),
            survey_date,
            ..Default::default()
        });
        Ok(match &self.schema {
            Some(path) => converter.with_schema(&Schema::load(path)?)?,
            None => converter,
        })
    }

    /// Validator using the chosen schema.
    pub fn validator(&self) -> Result<Validator, Box<dyn std::error::Error>> {
        Ok(match &self.schema {
            Some(path) => Validator::from_schema_path(path)?,
            None => Validator::standard(),
        })
    }
}
