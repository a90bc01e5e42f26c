//! In-memory host
//!
//! Holds browser state in process and records every write-side call.
//! Individual read sources can be made to fail.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;

use crate::capabilities::{
    BookmarkReader, ClosedSessionLister, HistorySearcher, SessionRestorer, TabActivator,
    TabLister, TabOpener, TopSitesReader,
};
use crate::error::HostError;
use crate::records::{
    BookmarkNode, ClosedSession, DataSource, HistoryItem, HistoryQuery, HostTab, TopSite,
};
use crate::Result;

/// A write-side call the page made against the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ActivateTab(i64),
    RestoreSession(String),
    OpenTab(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    bookmarks: Vec<BookmarkNode>,
    tabs: Vec<HostTab>,
    sessions: Vec<ClosedSession>,
    history: Vec<HistoryItem>,
    top_sites: Vec<TopSite>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    state: RwLock<MemoryState>,
    failing: RwLock<HashSet<DataSource>>,
    calls: Mutex<Vec<HostCall>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookmarks(self, bookmarks: Vec<BookmarkNode>) -> Self {
        self.state.write().bookmarks = bookmarks;
        self
    }

    pub fn with_tabs(self, tabs: Vec<HostTab>) -> Self {
        self.state.write().tabs = tabs;
        self
    }

    pub fn with_sessions(self, sessions: Vec<ClosedSession>) -> Self {
        self.state.write().sessions = sessions;
        self
    }

    pub fn with_history(self, history: Vec<HistoryItem>) -> Self {
        self.state.write().history = history;
        self
    }

    pub fn with_top_sites(self, top_sites: Vec<TopSite>) -> Self {
        self.state.write().top_sites = top_sites;
        self
    }

    /// Make reads of `source` fail until cleared
    pub fn fail_source(&self, source: DataSource) {
        self.failing.write().insert(source);
    }

    pub fn clear_failures(&self) {
        self.failing.write().clear();
    }

    /// Write-side calls in invocation order
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn tabs(&self) -> Vec<HostTab> {
        self.state.read().tabs.clone()
    }

    pub fn sessions(&self) -> Vec<ClosedSession> {
        self.state.read().sessions.clone()
    }

    fn check(&self, source: DataSource) -> Result<()> {
        if self.failing.read().contains(&source) {
            return Err(HostError::Unavailable {
                api: source.as_str(),
            });
        }
        Ok(())
    }

    fn record(&self, call: HostCall) {
        tracing::debug!(?call, "Memory host call");
        self.calls.lock().push(call);
    }

    fn next_tab_id(tabs: &[HostTab]) -> i64 {
        tabs.iter().filter_map(|t| t.id).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl BookmarkReader for MemoryHost {
    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>> {
        self.check(DataSource::Bookmarks)?;
        Ok(self.state.read().bookmarks.clone())
    }
}

#[async_trait]
impl TabLister for MemoryHost {
    async fn current_window_tabs(&self) -> Result<Vec<HostTab>> {
        self.check(DataSource::Tabs)?;
        Ok(self.state.read().tabs.clone())
    }
}

#[async_trait]
impl ClosedSessionLister for MemoryHost {
    async fn recently_closed(&self) -> Result<Vec<ClosedSession>> {
        self.check(DataSource::Sessions)?;
        Ok(self.state.read().sessions.clone())
    }
}

#[async_trait]
impl HistorySearcher for MemoryHost {
    async fn search_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>> {
        self.check(DataSource::History)?;
        let needle = query.text.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };

        Ok(self
            .state
            .read()
            .history
            .iter()
            .filter(|h| needle.is_empty() || contains(&h.title) || contains(&h.url))
            .take(query.max_results)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TopSitesReader for MemoryHost {
    async fn top_sites(&self) -> Result<Vec<TopSite>> {
        self.check(DataSource::TopSites)?;
        Ok(self.state.read().top_sites.clone())
    }
}

#[async_trait]
impl TabActivator for MemoryHost {
    async fn activate_tab(&self, tab_id: i64) -> Result<()> {
        self.record(HostCall::ActivateTab(tab_id));

        let mut state = self.state.write();
        if !state.tabs.iter().any(|t| t.id == Some(tab_id)) {
            return Err(HostError::NotFound(format!("tab {tab_id}")));
        }
        for tab in state.tabs.iter_mut() {
            tab.active = tab.id == Some(tab_id);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRestorer for MemoryHost {
    async fn restore_session(&self, session_id: &str) -> Result<()> {
        self.record(HostCall::RestoreSession(session_id.to_string()));

        let mut state = self.state.write();
        let index = state
            .sessions
            .iter()
            .position(|s| s.session_id() == Some(session_id))
            .ok_or_else(|| HostError::NotFound(format!("session {session_id}")))?;
        let session = state.sessions.remove(index);

        let restored = match (session.tab, session.window) {
            (Some(tab), _) => vec![tab],
            (None, Some(window)) => window.tabs,
            (None, None) => Vec::new(),
        };
        for tab in restored {
            let id = Self::next_tab_id(&state.tabs);
            state.tabs.push(HostTab {
                id: Some(id),
                title: tab.title,
                url: tab.url,
                active: false,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TabOpener for MemoryHost {
    async fn open_tab(&self, url: &str) -> Result<()> {
        self.record(HostCall::OpenTab(url.to_string()));

        let mut state = self.state.write();
        let id = Self::next_tab_id(&state.tabs);
        for tab in state.tabs.iter_mut() {
            tab.active = false;
        }
        state.tabs.push(HostTab {
            id: Some(id),
            title: None,
            url: Some(url.to_string()),
            active: true,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SessionTab;

    fn tab(id: i64, url: &str) -> HostTab {
        HostTab {
            id: Some(id),
            title: None,
            url: Some(url.to_string()),
            active: false,
        }
    }

    #[tokio::test]
    async fn test_failing_source_only_affects_that_source() {
        let host = MemoryHost::new().with_tabs(vec![tab(1, "https://a.example")]);
        host.fail_source(DataSource::Bookmarks);

        assert!(host.bookmark_tree().await.is_err());
        assert_eq!(host.current_window_tabs().await.unwrap().len(), 1);

        host.clear_failures();
        assert!(host.bookmark_tree().await.is_ok());
    }

    #[tokio::test]
    async fn test_history_search_respects_cap_and_text() {
        let history = (0..10)
            .map(|i| HistoryItem {
                id: i.to_string(),
                title: Some(format!("Page {i}")),
                url: Some(format!("https://site{i}.example")),
                ..Default::default()
            })
            .collect();
        let host = MemoryHost::new().with_history(history);

        let all = host
            .search_history(&HistoryQuery::new("", 4))
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let one = host
            .search_history(&HistoryQuery::new("SITE7", 100))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id, "7");
    }

    #[tokio::test]
    async fn test_activate_marks_single_tab() {
        let host =
            MemoryHost::new().with_tabs(vec![tab(1, "https://a.example"), tab(2, "https://b.example")]);

        host.activate_tab(2).await.unwrap();
        let active: Vec<_> = host.tabs().into_iter().filter(|t| t.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, Some(2));

        assert!(host.activate_tab(9).await.is_err());
        assert_eq!(
            host.calls(),
            vec![HostCall::ActivateTab(2), HostCall::ActivateTab(9)]
        );
    }

    #[tokio::test]
    async fn test_restore_window_reopens_all_tabs() {
        let window_tabs = vec![
            SessionTab {
                session_id: None,
                title: Some("One".to_string()),
                url: Some("https://one.example".to_string()),
            },
            SessionTab {
                session_id: None,
                title: Some("Two".to_string()),
                url: Some("https://two.example".to_string()),
            },
        ];
        let host = MemoryHost::new()
            .with_tabs(vec![tab(4, "https://a.example")])
            .with_sessions(vec![ClosedSession::closed_window("w-1", window_tabs)]);

        host.restore_session("w-1").await.unwrap();

        assert!(host.sessions().is_empty());
        let ids: Vec<_> = host.tabs().iter().filter_map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
        assert!(host.restore_session("w-1").await.is_err());
    }

    #[tokio::test]
    async fn test_open_tab_becomes_active() {
        let host = MemoryHost::new().with_tabs(vec![HostTab {
            active: true,
            ..tab(1, "https://a.example")
        }]);

        host.open_tab("https://new.example").await.unwrap();

        let tabs = host.tabs();
        assert_eq!(tabs.len(), 2);
        assert!(!tabs[0].active);
        assert!(tabs[1].active);
        assert_eq!(tabs[1].url.as_deref(), Some("https://new.example"));
    }
}
