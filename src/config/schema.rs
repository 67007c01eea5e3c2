//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::interpolate::placeholders;
use crate::config::types::{series_for, Config};
use crate::error::{ConfigError, ConfigResult};
use crate::tasks::is_plain_name;

/// Variables a listing URL may reference
const URL_VARIABLES: &[&str] = &["series", "name"];

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    validate_dataset(config)?;
    validate_source(config)?;
    validate_tables(config)?;
    Ok(())
}

fn validate_dataset(config: &Config) -> ConfigResult<()> {
    let name = config.dataset.name.as_str();
    if name.trim().is_empty() {
        return Err(ConfigError::MissingParameter("dataset.name".to_string()));
    }
    if !is_plain_name(name) || name != name.trim() {
        return Err(ConfigError::Invalid(format!(
            "Dataset name '{}' must be a single path component",
            name
        )));
    }

    match (&config.dataset.series, series_for(name)) {
        (Some(series), _) if series.trim().is_empty() => {
            Err(ConfigError::MissingParameter("dataset.series".to_string()))
        }
        (Some(series), Some(expected)) if *series != expected => Err(ConfigError::Invalid(
            format!(
                "Series '{}' does not hold dataset '{}' (expected '{}')",
                series, name, expected
            ),
        )),
        (None, None) => Err(ConfigError::MissingParameter("dataset.series".to_string())),
        _ => Ok(()),
    }
}

fn validate_source(config: &Config) -> ConfigResult<()> {
    if config.source.link_pattern.is_empty() {
        return Err(ConfigError::MissingParameter("source.link_pattern".to_string()));
    }
    for var in placeholders(&config.source.base_url) {
        if !URL_VARIABLES.contains(&var.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Unknown variable '${{{}}}' in source.base_url. Must be one of: {}",
                var,
                URL_VARIABLES.join(", ")
            )));
        }
    }
    Ok(())
}

fn validate_tables(config: &Config) -> ConfigResult<()> {
    if config.tables.is_empty() {
        return Err(ConfigError::Invalid("At least one table is required".to_string()));
    }

    let mut seen = std::collections::HashSet::new();
    for table in &config.tables {
        if !is_plain_name(table) {
            return Err(ConfigError::Invalid(format!("Invalid table name '{}'", table)));
        }
        if !seen.insert(table.as_str()) {
            return Err(ConfigError::Invalid(format!("Table '{}' listed twice", table)));
        }
    }

    let reduce = &config.reduce;
    if !config.tables.contains(&reduce.table) {
        return Err(ConfigError::Invalid(format!(
            "Reduced table source '{}' is not one of the tables",
            reduce.table
        )));
    }
    if !is_plain_name(&reduce.name) || config.tables.contains(&reduce.name) {
        return Err(ConfigError::Invalid(format!(
            "Reduced table name '{}' must be a new, valid table name",
            reduce.name
        )));
    }
    Ok(())
}
