//! Configuration loading from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::schema::{ApiConfig, Environment};
use crate::config::validation::validate_config;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(BTreeMap<String, String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, (field, message)) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{} {}", field, message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub environment: Option<Environment>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ApiConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(environment) = self.environment {
            config.server.environment = environment;
        }
    }
}

fn parse_unvalidated(content: &str) -> Result<ApiConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

fn finish(mut config: ApiConfig, overrides: &Overrides) -> Result<ApiConfig, ConfigError> {
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ApiConfig, ConfigError> {
    finish(parse_unvalidated(content)?, &Overrides::default())
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ApiConfig, ConfigError> {
    resolve_config(Some(path), &Overrides::default())
}

/// Build the effective configuration: file (or defaults), then
/// `overrides`, then a single validation pass over the result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<ApiConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_unvalidated(&content)?
        }
        None => ApiConfig::default(),
    };
    finish(config, overrides)
}
