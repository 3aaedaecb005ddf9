//! Preference persistence utilities
//!
//! Loads and saves an application's preference blob as TOML under the
//! platform configuration directory.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("could not determine config directory")]
    NoConfigDir,
    /// IO error while reading/writing config
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Base configuration directory shared by every app in the workspace
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "sky-strips", "sky-strips")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Configuration file path for a named app
pub fn config_path(app_name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(format!("{}.toml", app_name)))
}

/// Load the preference blob for an app
///
/// Returns `None` if nothing has been saved yet.
/// Returns an error if the file exists but can't be parsed.
pub fn load_config<T: DeserializeOwned>(app_name: &str) -> Result<Option<T>, ConfigError> {
    let path = config_path(app_name).ok_or(ConfigError::NoConfigDir)?;

    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)?;
    let config: T = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "loaded preferences");
    Ok(Some(config))
}

/// Save the preference blob for an app
pub fn save_config<T: Serialize>(app_name: &str, config: &T) -> Result<(), ConfigError> {
    let path = config_path(app_name).ok_or(ConfigError::NoConfigDir)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&path, render_config(config)?)?;
    tracing::debug!(path = %path.display(), "saved preferences");
    Ok(())
}

/// Parse a preference blob from TOML text
pub fn parse_config<T: DeserializeOwned>(contents: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Render a preference blob as TOML text
pub fn render_config<T: Serialize>(config: &T) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}
