//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AddonConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("PORT is not a valid port: {0:?}")]
    Port(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML configuration file without validating it.
pub fn read_config(path: &Path) -> Result<AddonConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
pub fn apply_env<F>(config: &mut AddonConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(PORT_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.listener.port = trimmed.parse().map_err(|_| ConfigError::Port(raw.clone()))?;
        }
    }
    Ok(())
}

/// Load the optional config file, apply the process environment, then
/// `port_override` (from the command line), and validate.
pub fn load_config(
    path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<AddonConfig, ConfigError> {
    load_config_with(path, port_override, |key| std::env::var(key).ok())
}

fn load_config_with<F>(
    path: Option<&Path>,
    port_override: Option<u16>,
    lookup: F,
) -> Result<AddonConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => AddonConfig::default(),
    };
    apply_env(&mut config, lookup)?;
    if let Some(port) = port_override {
        config.listener.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
