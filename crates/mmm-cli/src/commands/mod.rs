pub mod init;
pub mod play;
pub mod quotes;
pub mod settings;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mmm_store::{load_config_from, MmmConfig, SqliteStore};

/// Load the config, letting `--db` win over every other source.
pub fn load_config(path: Option<&Path>, db: Option<PathBuf>) -> Result<MmmConfig> {
    let mut config = load_config_from(path)?;
    if let Some(db) = db {
        config.database = db;
    }
    Ok(config)
}

/// Open the settings database named by the config.
pub fn open_store(config: &MmmConfig) -> Result<SqliteStore> {
    SqliteStore::open(&config.database)
        .with_context(|| format!("failed to open database: {}", config.database.display()))
}
