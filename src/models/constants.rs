/// Maximum allowed length for stage and template names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum allowed length for template descriptions and task descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Default number of decimals shown for progress percentages.
pub const DEFAULT_PERCENT_DECIMALS: usize = 0;

/// Directory holding the catalog and config, relative to the working directory.
pub const DATA_DIR: &str = ".stagehand";

/// Catalog file name inside [`DATA_DIR`].
pub const CATALOG_FILE: &str = "catalog.json";

/// Config file name inside [`DATA_DIR`].
pub const CONFIG_FILE: &str = "config.toml";
