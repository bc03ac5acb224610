//! mmm-store: persistence and configuration.
//!
//! Implements the `SettingsStore` trait on top of SQLite and loads the
//! application's TOML configuration.

pub mod config;
pub mod error;
pub mod sqlite;

pub use config::{load_config, load_config_from, MmmConfig};
pub use error::StoreError;
pub use sqlite::SqliteStore;
