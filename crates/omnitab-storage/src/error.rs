//! Storage error types

use omnitab_host::HostError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<StorageError> for HostError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => HostError::NotFound(what),
            StorageError::InvalidUrl(url) => HostError::InvalidUrl(url),
            other => HostError::Storage(other.to_string()),
        }
    }
}
