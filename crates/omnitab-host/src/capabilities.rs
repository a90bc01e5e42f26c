//! Capability traits over the host browser
//!
//! Each trait is one host API. `HostApis` bundles them so the page can be
//! wired to a real extension bridge, the SQLite host, or a test fake.

use async_trait::async_trait;
use std::sync::Arc;

use crate::records::{BookmarkNode, ClosedSession, HistoryItem, HistoryQuery, HostTab, TopSite};
use crate::Result;

#[async_trait]
pub trait BookmarkReader: Send + Sync {
    /// Full bookmark tree, roots first
    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>>;
}

#[async_trait]
pub trait TabLister: Send + Sync {
    async fn current_window_tabs(&self) -> Result<Vec<HostTab>>;
}

#[async_trait]
pub trait ClosedSessionLister: Send + Sync {
    async fn recently_closed(&self) -> Result<Vec<ClosedSession>>;
}

#[async_trait]
pub trait HistorySearcher: Send + Sync {
    async fn search_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>>;
}

#[async_trait]
pub trait TopSitesReader: Send + Sync {
    async fn top_sites(&self) -> Result<Vec<TopSite>>;
}

#[async_trait]
pub trait TabActivator: Send + Sync {
    async fn activate_tab(&self, tab_id: i64) -> Result<()>;
}

#[async_trait]
pub trait SessionRestorer: Send + Sync {
    async fn restore_session(&self, session_id: &str) -> Result<()>;
}

#[async_trait]
pub trait TabOpener: Send + Sync {
    async fn open_tab(&self, url: &str) -> Result<()>;
}

/// A single object providing every capability.
pub trait Host:
    BookmarkReader
    + TabLister
    + ClosedSessionLister
    + HistorySearcher
    + TopSitesReader
    + TabActivator
    + SessionRestorer
    + TabOpener
{
}

impl<T> Host for T where
    T: BookmarkReader
        + TabLister
        + ClosedSessionLister
        + HistorySearcher
        + TopSitesReader
        + TabActivator
        + SessionRestorer
        + TabOpener
{
}

/// The injected capability set.
#[derive(Clone)]
pub struct HostApis {
    pub bookmarks: Arc<dyn BookmarkReader>,
    pub tabs: Arc<dyn TabLister>,
    pub sessions: Arc<dyn ClosedSessionLister>,
    pub history: Arc<dyn HistorySearcher>,
    pub top_sites: Arc<dyn TopSitesReader>,
    pub activator: Arc<dyn TabActivator>,
    pub restorer: Arc<dyn SessionRestorer>,
    pub opener: Arc<dyn TabOpener>,
}

impl HostApis {
    /// Wire every capability to the same host object
    pub fn from_host<H: Host + 'static>(host: Arc<H>) -> Self {
        Self {
            bookmarks: host.clone(),
            tabs: host.clone(),
            sessions: host.clone(),
            history: host.clone(),
            top_sites: host.clone(),
            activator: host.clone(),
            restorer: host.clone(),
            opener: host,
        }
    }
}

impl std::fmt::Debug for HostApis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostApis").finish_non_exhaustive()
    }
}
