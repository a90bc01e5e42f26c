//! Omnitab Storage
//!
//! SQLite-backed stand-in for the browser: bookmarks, open tabs, recently
//! closed sessions and history live in one database, and `SqliteHost`
//! serves them through the host capability traits.

mod database;
mod error;
mod host;
mod migrations;

pub use database::Database;
pub use error::StorageError;
pub use host::SqliteHost;

pub type Result<T> = std::result::Result<T, StorageError>;
