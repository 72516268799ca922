//! Fill data from TOML documents
//!
//! Tables become maps, arrays become containers, strings become literals
//! and other scalars become literals of their TOML display form.

use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

use crate::provider::Provider;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse data TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Read a TOML data file
pub fn load_data(path: &Path) -> Result<Table, DataError> {
    let content = std::fs::read_to_string(path)?;
    parse_data(&content)
}

pub fn parse_data(content: &str) -> Result<Table, DataError> {
    Ok(toml::from_str(content)?)
}

/// Provider borrowing from a TOML value
pub fn provider_from_toml(value: &Value) -> Provider<'_> {
    match value {
        Value::String(text) => Provider::literal(text.as_str()),
        Value::Integer(number) => Provider::display(number),
        Value::Float(number) => Provider::display(number),
        Value::Boolean(flag) => Provider::display(flag),
        Value::Datetime(datetime) => Provider::display(datetime),
        Value::Array(items) => Provider::Container(items.iter().map(provider_from_toml).collect()),
        Value::Table(table) => provider_from_table(table),
    }
}

pub fn provider_from_table(table: &Table) -> Provider<'_> {
    Provider::Map(
        table
            .iter()
            .map(|(key, value)| (key.clone(), provider_from_toml(value)))
            .collect(),
    )
}
