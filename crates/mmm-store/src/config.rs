//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mmm_core::{PenaltyPolicy, SessionOptions};

/// Top-level memory-master-mind configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmmConfig {
    /// SQLite database holding challenge and app settings.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Log file used while the terminal UI owns the screen.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Quote source used when the quotes challenge has none of its own.
    #[serde(default)]
    pub quotes_path: Option<PathBuf>,
    /// How wrong answers within one attempt chain cost levels.
    #[serde(default)]
    pub penalty: PenaltyPolicy,
    /// Pause between items of the timed sequence (0 disables).
    #[serde(default = "default_blink_ms")]
    pub blink_ms: u64,
}

/// Written by `mmm init`.
pub const SAMPLE_CONFIG: &str = r#"# memory-master-mind configuration

# SQLite database with challenge and app settings.
# database = "~/.local/share/mmm/appdata.sqlite3"

# Log file used by `mmm play`.
# log_file = "~/.local/share/mmm/mmm.log"

# Quote source (CSV, first column) used when the quotes challenge has no
# quotes_path of its own. The bundled quotes are used when unset.
# quotes_path = "~/quotes.csv"

# "first_wrong": only the first failure of a challenge costs a level.
# "every_wrong": every wrong answer costs a level.
penalty = "first_wrong"

# Blank pause between items of the timed sequence, in milliseconds.
blink_ms = 500
"#;

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MMM_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local").join("share").join("mmm"),
        Err(_) => PathBuf::from(".mmm"),
    }
}

fn default_database() -> PathBuf {
    data_dir().join("appdata.sqlite3")
}
fn default_log_file() -> PathBuf {
    data_dir().join("mmm.log")
}
fn default_blink_ms() -> u64 {
    500
}

impl Default for MmmConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            log_file: default_log_file(),
            quotes_path: None,
            penalty: PenaltyPolicy::default(),
            blink_ms: default_blink_ms(),
        }
    }
}

impl MmmConfig {
    /// Blink duration, `None` when disabled.
    pub fn blink(&self) -> Option<Duration> {
        (self.blink_ms > 0).then(|| Duration::from_millis(self.blink_ms))
    }

    /// Options for a challenge session built from this config.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            penalty: self.penalty,
            blink: self.blink(),
            quotes_path: self.quotes_path.clone(),
            ..SessionOptions::default()
        }
    }

    /// Expand a leading `~` in every configured path.
    fn expand_paths(&mut self) {
        self.database = expand(&self.database);
        self.log_file = expand(&self.log_file);
        self.quotes_path = self.quotes_path.as_deref().map(expand);
    }

    fn apply_db_override(&mut self, value: Option<String>) {
        if let Some(db) = value.filter(|v| !v.is_empty()) {
            self.database = mmm_core::settings::expand_home(&db);
        }
    }
}

fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => mmm_core::settings::expand_home(s),
        None => path.to_path_buf(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mmm.toml` in the current directory
/// 2. `~/.config/mmm/config.toml`
///
/// Environment variable override: `MMM_DB_PATH`.
pub fn load_config() -> Result<MmmConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MmmConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mmm.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MmmConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MmmConfig::default(),
    };

    config.expand_paths();
    config.apply_db_override(std::env::var("MMM_DB_PATH").ok());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mmm"))
}
