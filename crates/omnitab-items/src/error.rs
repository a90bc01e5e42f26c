//! Item error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("Invalid tab id: {0:?}")]
    InvalidTabId(String),

    #[error("Session item has no session id: {0}")]
    MissingSessionId(String),
}
