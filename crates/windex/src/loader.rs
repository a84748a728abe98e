//! Locating and reading configuration documents.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::UserConfig;

/// The configuration file does not exist or is not a regular file.
#[derive(Debug, Error)]
#[error("config file not found: {}", .path.display())]
pub struct ConfigNotFound {
    pub path: PathBuf,
}

impl ConfigNotFound {
    /// Process exit code reported for a missing configuration
    pub const EXIT_CODE: u8 = 2;
}

/// A configuration document together with where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: UserConfig,
}

impl LoadedConfig {
    /// Directory module identifiers in the configuration resolve against
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Make `path` absolute against the current working directory
pub fn resolve_config_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    Ok(cwd.join(path))
}

/// Load the configuration at `path`, failing with [`ConfigNotFound`] when it is absent
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    let path = resolve_config_path(path)?;
    if !path.is_file() {
        return Err(ConfigNotFound { path }.into());
    }

    log::info!("Loading config from {}", path.display());
    let config = load_document(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(LoadedConfig { path, config })
}

/// Deserialize a TOML or JSON document, chosen by extension; anything else is read as TOML
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML in {}", path.display()))
    }
}
