//! SQLite-backed settings store.
//!
//! Records live in a single `challenge_settings` table, one JSON blob per
//! challenge id (plus the application record).

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use mmm_core::traits::SettingsStore;

use crate::error::StoreError;

/// Settings store persisted in a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        debug!(target: "mmm::store", path = %path.display(), "opened settings database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A database that lives only as long as the store.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS challenge_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                challenge VARCHAR UNIQUE NOT NULL,
                settings_json VARCHAR NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Raw JSON text stored under `key`.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT settings_json FROM challenge_settings WHERE challenge = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }

    /// Insert or replace the raw JSON text stored under `key`.
    pub fn put_raw(&self, key: &str, json: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO challenge_settings (challenge, settings_json) VALUES (?1, ?2)
             ON CONFLICT(challenge) DO UPDATE SET settings_json = excluded.settings_json",
            params![key, json],
        )?;
        Ok(())
    }

    /// Ids of every stored record, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT challenge FROM challenge_settings ORDER BY challenge")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl SettingsStore for SqliteStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(target: "mmm::store", %key, error = %e, "stored settings are not valid JSON");
                Ok(None)
            }
        }
    }

    fn put(&self, key: &str, record: &serde_json::Value) -> anyhow::Result<()> {
        let json = serde_json::to_string(record).map_err(StoreError::from)?;
        self.put_raw(key, &json)?;
        Ok(())
    }
}
