//! Core trait definitions for the external collaborators of a session.
//!
//! The settings store is implemented by `mmm-store` (SQLite) and the stats
//! sink by `mmm-stats` (CSV log). An in-memory store lives here so sessions
//! can run without touching disk.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;

use crate::model::StatsRecord;

// ---------------------------------------------------------------------------
// Settings store
// ---------------------------------------------------------------------------

/// Key/value store of opaque JSON settings records keyed by challenge id.
pub trait SettingsStore: Send + Sync {
    /// Fetch the record stored under `key`, if any.
    fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;

    /// Insert or replace the record stored under `key`.
    fn put(&self, key: &str, record: &serde_json::Value) -> anyhow::Result<()>;
}

/// A settings store that keeps records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow!("settings store lock poisoned"))?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, record: &serde_json::Value) -> anyhow::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow!("settings store lock poisoned"))?;
        records.insert(key.to_string(), record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stats sink
// ---------------------------------------------------------------------------

/// Append-only destination for solved-challenge records.
pub trait StatsSink: Send + Sync {
    fn record(&self, entry: &StatsRecord) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_put_get() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());
        store.put("a", &json!({"level": 3})).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!({"level": 3})));
        store.put("a", &json!({"level": 4})).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().unwrap()["level"], 4);
    }
}
