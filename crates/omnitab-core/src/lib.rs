//! Omnitab Core
//!
//! The new-tab page: load five host sources concurrently, merge them into
//! one list, filter it as the user types, and send clicks back to the host.

mod config;
mod error;
mod loader;
mod page;

pub use config::{Config, LoadPolicy};
pub use error::CoreError;
pub use loader::{fetch_all, fetch_each};
pub use page::{ItemRow, LoadState, NewTabPage};

pub use omnitab_host::{DataSource, HostApis, HostError, MemoryHost};
pub use omnitab_items::{Item, ItemAction, ItemKind};
pub use omnitab_storage::{Database, SqliteHost};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

/// Open the SQLite host at `config.database_path` and wire every capability to it.
/// Also installs logging with `config.log_filter` if nothing else has.
pub fn local_host(config: &Config) -> Result<HostApis> {
    init_logging(&config.log_filter);
    let db = Database::open(&config.database_path)?;
    Ok(HostApis::from_host(std::sync::Arc::new(SqliteHost::new(db))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_host_on_fresh_database() {
        let dir = std::env::temp_dir().join(format!("omnitab-{}", uuid::Uuid::new_v4()));
        let config = Config::new(dir.clone());

        let apis = local_host(&config).unwrap();
        let page = NewTabPage::mount(apis, config).await;

        assert_eq!(page.state(), LoadState::Ready);
        assert!(page.items().is_empty());
        assert!(page.failed_sources().is_empty());
        assert!(dir.join("omnitab.db").exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("debug");
        init_logging("warn");
        assert!(tracing::dispatcher::has_been_set());
    }
}
