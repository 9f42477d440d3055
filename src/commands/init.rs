use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::fs::DataDir;
use crate::models::constants::DATA_DIR;

/// Create `.stagehand/` with a default config and an empty catalog.
pub fn execute(base: &Path) -> Result<()> {
    let data_dir = DataDir::new(base);
    data_dir.initialize()?;

    println!(
        "  {} Initialized {}",
        "✓".green().bold(),
        format!("{DATA_DIR}/").dimmed()
    );
    println!("    {}", data_dir.config_path().display().to_string().dimmed());
    println!("    {}", data_dir.catalog_path().display().to_string().dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_execute_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        execute(temp_dir.path()).unwrap();
        assert!(temp_dir.path().join(DATA_DIR).is_dir());
        assert!(execute(temp_dir.path()).is_err());
    }
}
