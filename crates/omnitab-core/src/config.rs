//! Page configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use omnitab_host::HistoryQuery;

use crate::error::CoreError;
use crate::Result;

/// How a failing source affects the load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// One failure leaves the list empty
    #[default]
    AllOrNothing,
    /// Failing sources contribute nothing, the rest still populate
    PerSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text passed to the history search
    pub history_text: String,
    /// Cap on history entries
    pub history_max_results: usize,
    pub load_policy: LoadPolicy,
    /// Opened by the header logo
    pub project_url: String,
    pub search_placeholder: String,
    /// Used when `RUST_LOG` is not set
    pub log_filter: String,
    /// SQLite file for the local host
    pub database_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            history_text: String::new(),
            history_max_results: 1000,
            load_policy: LoadPolicy::AllOrNothing,
            project_url: "https://github.com/omnitab/omnitab".to_string(),
            search_placeholder: "Search...".to_string(),
            log_filter: "info".to_string(),
            database_path: data_dir.join("omnitab.db"),
        }
    }

    pub fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "Omnitab")
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".omnitab"))
    }

    /// Missing fields take their defaults
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_max_results == 0 {
            return Err(CoreError::Config(
                "history_max_results must be at least 1".to_string(),
            ));
        }
        if self.project_url.trim().is_empty() {
            return Err(CoreError::Config("project_url cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn history_query(&self) -> HistoryQuery {
        HistoryQuery::new(self.history_text.clone(), self.history_max_results)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
