//! Writing configuration files.
//!
//! Reading goes through [`super::load_config`]; this module produces a
//! starter TOML file with every key spelled out. The API key is never
//! written.

use std::path::Path;

use super::Config;

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}
