//! Core error types

use omnitab_host::{DataSource, HostError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to fetch {data_source}: {error}")]
    Fetch {
        data_source: DataSource,
        #[source]
        error: HostError,
    },

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Item error: {0}")]
    Item(#[from] omnitab_items::ItemError),

    #[error("Storage error: {0}")]
    Storage(#[from] omnitab_storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn fetch(data_source: DataSource) -> impl FnOnce(HostError) -> CoreError {
        move |error| CoreError::Fetch { data_source, error }
    }

    /// Source that failed, for fetch errors
    pub fn data_source(&self) -> Option<DataSource> {
        match self {
            CoreError::Fetch { data_source, .. } => Some(*data_source),
            _ => None,
        }
    }
}
