use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::constants::{CATALOG_FILE, CONFIG_FILE, DATA_DIR};
use crate::service::Catalog;

/// The `.stagehand/` directory holding the catalog and local config.
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            root: base_path.as_ref().join(DATA_DIR),
        }
    }

    /// Create the directory with a default config and an empty catalog.
    pub fn initialize(&self) -> Result<()> {
        if self.root.exists() {
            bail!("{DATA_DIR} directory already exists");
        }

        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {DATA_DIR} directory"))?;

        let config = toml::to_string_pretty(&Config::default())
            .context("Failed to serialize default config")?;
        fs::write(self.config_path(), config).context("Failed to write config.toml")?;

        let catalog = serde_json::to_string_pretty(&Catalog::new())
            .context("Failed to serialize empty catalog")?;
        fs::write(self.catalog_path(), catalog).context("Failed to write catalog.json")?;

        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_files() {
        let temp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::new(temp.path());

        data_dir.initialize().unwrap();

        assert!(data_dir.exists());
        assert!(data_dir.config_path().exists());
        assert!(data_dir.catalog_path().exists());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let temp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::new(temp.path());

        data_dir.initialize().unwrap();
        let err = data_dir.initialize().unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
