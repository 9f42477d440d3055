//! Configuration loading
//!
//! Search order: an explicit `--config` path, then `./.stagehand/config.toml`,
//! then `<config dir>/stagehand/config.toml`. A missing file means defaults;
//! a file that exists but does not parse is an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::constants::{
    CATALOG_FILE, CONFIG_FILE, DATA_DIR, DEFAULT_PERCENT_DECIMALS,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub log: LogConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file; relative paths resolve against the working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"stagehand=debug"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub percent_decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            percent_decimals: DEFAULT_PERCENT_DECIMALS,
        }
    }
}

impl Config {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Catalog file to use, relative to `base` unless configured absolute.
    pub fn catalog_path(&self, base: &Path) -> PathBuf {
        match &self.catalog.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(DATA_DIR).join(CATALOG_FILE),
        }
    }
}

/// Load configuration following the search order.
///
/// An explicit path must exist.
pub fn load(explicit: Option<&Path>, base: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::from_file(path);
    }

    for candidate in search_paths(base) {
        if candidate.exists() {
            return Config::from_file(&candidate);
        }
    }

    Ok(Config::default())
}

fn search_paths(base: &Path) -> Vec<PathBuf> {
    let mut paths = vec![base.join(DATA_DIR).join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("stagehand").join(CONFIG_FILE));
    }
    paths
}
