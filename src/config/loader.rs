//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::policy::{ConfigurationError, RuleSet};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid CORS rules: {0}")]
    Policy(#[from] ConfigurationError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Parse and validate configuration from TOML text.
///
/// CORS rules are compiled once here so a bad rule set is rejected before
/// anything is served or swapped in.
pub fn load_from_str(content: &str) -> Result<GateConfig, ConfigError> {
    let config: GateConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    if let Some(rules) = &config.cors.rules {
        RuleSet::compile(rules)?;
    }

    Ok(config)
}
