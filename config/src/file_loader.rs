//! # Configuration File Loading
//!
//! Loads a [`ConfigLayer`] from a TOML or YAML file, picking the format from
//! the file extension.

use crate::config::ConfigLayer;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML config: {0}")]
    YamlParse(String),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String)
}

pub fn load_from_toml(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| ConfigFileError::FileNotFound(path.display().to_string()))?;

    toml::from_str(&contents).map_err(|e| ConfigFileError::TomlParse(e.to_string()))
}

pub fn load_from_yaml(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| ConfigFileError::FileNotFound(path.display().to_string()))?;

    // An empty YAML file is a null document, not an error.
    if contents.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }

    serde_yaml::from_str(&contents).map_err(|e| ConfigFileError::YamlParse(e.to_string()))
}

/// Load a configuration layer, detecting the format from the extension
/// (`.toml`, `.yaml`, `.yml`).
pub fn load_from_file(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string()))
    }
}
