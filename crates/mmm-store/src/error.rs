//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the SQLite settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or queried.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A record could not be serialized.
    #[error("invalid settings record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database directory could not be created.
    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The connection mutex was poisoned by a panicking thread.
    #[error("database connection lock poisoned")]
    Poisoned,
}
