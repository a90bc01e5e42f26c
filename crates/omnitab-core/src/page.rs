//! New-tab page
//!
//! ```text
//! Loading --load()--> Ready
//! ```
//! There is no way back to `Loading`; a page is loaded once and dropped
//! with the tab.

use serde::Serialize;

use omnitab_host::{DataSource, HostApis};
use omnitab_items::{filter_items, Item, ItemAction};

use crate::config::{Config, LoadPolicy};
use crate::error::CoreError;
use crate::loader::{fetch_all, fetch_each};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
}

/// What the list shows for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    pub key: String,
    pub icon: &'static str,
    pub label: &'static str,
    pub title: String,
    pub url: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            key: item.key(),
            icon: item.kind.icon(),
            label: item.kind.label(),
            title: item.title.clone(),
            url: item.url.clone(),
        }
    }
}

pub struct NewTabPage {
    config: Config,
    apis: HostApis,
    state: LoadState,
    items: Vec<Item>,
    query: String,
    failed_sources: Vec<DataSource>,
}

impl NewTabPage {
    pub fn new(apis: HostApis, config: Config) -> Self {
        Self {
            config,
            apis,
            state: LoadState::Loading,
            items: Vec::new(),
            query: String::new(),
            failed_sources: Vec::new(),
        }
    }

    /// Create and load in one step
    pub async fn mount(apis: HostApis, config: Config) -> Self {
        let mut page = Self::new(apis, config);
        page.load().await;
        page
    }

    /// Fetch every source and build the item list.
    ///
    /// Failures are logged, never returned; the page is `Ready` afterwards
    /// whatever happened.
    pub async fn load(&mut self) {
        let history_query = self.config.history_query();

        let (items, errors) = match self.config.load_policy {
            LoadPolicy::AllOrNothing => match fetch_all(&self.apis, &history_query).await {
                Ok(batch) => (batch.into_items(), Vec::new()),
                Err(e) => (Vec::new(), vec![e]),
            },
            LoadPolicy::PerSource => {
                let (batch, errors) = fetch_each(&self.apis, &history_query).await;
                (batch.into_items(), errors)
            }
        };

        for error in &errors {
            tracing::error!(
                source = ?error.data_source(),
                policy = ?self.config.load_policy,
                "Failed to load new tab data: {}",
                error
            );
        }

        self.failed_sources = errors.iter().filter_map(CoreError::data_source).collect();
        self.items = items;
        self.state = LoadState::Ready;

        tracing::info!(
            items = self.items.len(),
            failed = self.failed_sources.len(),
            "New tab page ready"
        );
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Sources whose fetch failed during the last load
    pub fn failed_sources(&self) -> &[DataSource] {
        &self.failed_sources
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_placeholder(&self) -> &str {
        &self.config.search_placeholder
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        tracing::debug!(query = %self.query, "Query changed");
    }

    /// Items matching the current query, in merge order
    pub fn visible_items(&self) -> Vec<&Item> {
        filter_items(&self.items, &self.query)
    }

    /// Empty while loading
    pub fn rows(&self) -> Vec<ItemRow> {
        if self.is_loading() {
            return Vec::new();
        }
        self.visible_items().into_iter().map(ItemRow::from).collect()
    }

    /// Send the item's action to the host
    pub async fn click(&self, item: &Item) -> Result<ItemAction> {
        let action = item.action().map_err(|e| {
            tracing::warn!(key = %item.key(), "Cannot dispatch item: {}", e);
            CoreError::from(e)
        })?;

        let result = match &action {
            ItemAction::ActivateTab(tab_id) => self.apis.activator.activate_tab(*tab_id).await,
            ItemAction::RestoreSession(session_id) => {
                self.apis.restorer.restore_session(session_id).await
            }
            ItemAction::OpenUrl(url) => self.apis.opener.open_tab(url).await,
        };

        match result {
            Ok(()) => {
                tracing::debug!(key = %item.key(), ?action, "Dispatched item");
                Ok(action)
            }
            Err(e) => {
                tracing::error!(key = %item.key(), ?action, "Host rejected item action: {}", e);
                Err(e.into())
            }
        }
    }

    /// Keyboard activation: Enter or space, anything else is ignored
    pub async fn key_press(&self, item: &Item, key: &str) -> Result<Option<ItemAction>> {
        match key {
            "Enter" | " " => self.click(item).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Header logo
    pub async fn open_project_page(&self) -> Result<()> {
        self.apis.opener.open_tab(&self.config.project_url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use omnitab_host::{
        BookmarkNode, BookmarkReader, ClosedSession, ClosedSessionLister, HistoryItem,
        HistoryQuery, HistorySearcher, HostCall, HostTab, MemoryHost, TabLister, TabOpener,
        TopSite, TopSitesReader,
    };
    use omnitab_items::ItemKind;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn config(policy: LoadPolicy) -> Config {
        Config {
            load_policy: policy,
            ..Config::new(PathBuf::from("/tmp/omnitab-test"))
        }
    }

    fn populated_host() -> MemoryHost {
        MemoryHost::new()
            .with_bookmarks(vec![BookmarkNode::folder(
                "1",
                "A",
                vec![BookmarkNode::link("2", "B", "http://b")],
            )])
            .with_tabs(vec![HostTab {
                id: Some(11),
                title: Some("Banana".to_string()),
                url: Some("http://x".to_string()),
                active: true,
            }])
            .with_sessions(vec![ClosedSession::closed_tab("s-1", "Apple", "http://b")])
            .with_history(vec![HistoryItem {
                id: "1".to_string(),
                ..Default::default()
            }])
            .with_top_sites(vec![TopSite {
                title: "News".to_string(),
                url: "https://news.example".to_string(),
            }])
    }

    async fn mounted(policy: LoadPolicy) -> (Arc<MemoryHost>, NewTabPage) {
        let host = Arc::new(populated_host());
        let page = NewTabPage::mount(HostApis::from_host(host.clone()), config(policy)).await;
        (host, page)
    }

    fn find(page: &NewTabPage, kind: ItemKind) -> Item {
        page.items()
            .iter()
            .find(|i| i.kind == kind)
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_loading_then_ready() {
        let host = Arc::new(populated_host());
        let mut page = NewTabPage::new(HostApis::from_host(host), config(LoadPolicy::AllOrNothing));
        assert_eq!(page.state(), LoadState::Loading);
        assert!(page.rows().is_empty());

        page.load().await;
        assert_eq!(page.state(), LoadState::Ready);
        assert_eq!(page.items().len(), 5);

        let keys: Vec<_> = page.rows().into_iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec![
                "bookmark-2",
                "tab-11",
                "session-s-1",
                "history-1",
                "topSite-https://news.example"
            ]
        );
    }

    #[tokio::test]
    async fn test_rows_carry_icon_and_label() {
        let (_, page) = mounted(LoadPolicy::AllOrNothing).await;
        let rows = page.rows();
        assert_eq!(rows[0].icon, "🔖");
        assert_eq!(rows[4].label, "top site");
        assert_eq!(rows[3].title, " ");
        assert_eq!(rows[3].url, " ");
    }

    #[tokio::test]
    async fn test_query_b_skips_session_url_match() {
        let (_, mut page) = mounted(LoadPolicy::AllOrNothing).await;
        page.set_query("b");

        let kinds: Vec<_> = page.visible_items().iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&ItemKind::Tab));
        assert!(kinds.contains(&ItemKind::Bookmark));
        assert!(!kinds.contains(&ItemKind::Session));

        page.set_query("APPLE");
        let kinds: Vec<_> = page.visible_items().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Session]);

        page.set_query("");
        assert_eq!(page.visible_items().len(), 5);
    }

    #[tokio::test]
    async fn test_all_or_nothing_blanks_list() {
        let host = Arc::new(populated_host());
        host.fail_source(DataSource::History);

        let page = NewTabPage::mount(
            HostApis::from_host(host),
            config(LoadPolicy::AllOrNothing),
        )
        .await;

        assert_eq!(page.state(), LoadState::Ready);
        assert!(page.items().is_empty());
        assert_eq!(page.failed_sources(), &[DataSource::History]);
    }

    #[tokio::test]
    async fn test_per_source_keeps_the_rest() {
        let host = Arc::new(populated_host());
        host.fail_source(DataSource::History);
        host.fail_source(DataSource::Bookmarks);

        let page =
            NewTabPage::mount(HostApis::from_host(host), config(LoadPolicy::PerSource)).await;

        let kinds: Vec<_> = page.items().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ItemKind::Tab, ItemKind::Session, ItemKind::TopSite]
        );
        assert_eq!(
            page.failed_sources(),
            &[DataSource::Bookmarks, DataSource::History]
        );
    }

    #[tokio::test]
    async fn test_click_dispatch_by_kind() {
        let (host, page) = mounted(LoadPolicy::AllOrNothing).await;

        let session = find(&page, ItemKind::Session);
        assert_eq!(
            page.click(&session).await.unwrap(),
            ItemAction::RestoreSession("s-1".to_string())
        );

        page.click(&find(&page, ItemKind::Tab)).await.unwrap();
        page.click(&find(&page, ItemKind::Bookmark)).await.unwrap();
        page.click(&find(&page, ItemKind::TopSite)).await.unwrap();

        assert_eq!(
            host.calls(),
            vec![
                HostCall::RestoreSession("s-1".to_string()),
                HostCall::ActivateTab(11),
                HostCall::OpenTab("http://b".to_string()),
                HostCall::OpenTab("https://news.example".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_click_errors_are_returned() {
        let (host, page) = mounted(LoadPolicy::AllOrNothing).await;

        let orphan = Item::new(ItemKind::Tab, "", "", "");
        assert!(matches!(
            page.click(&orphan).await,
            Err(CoreError::Item(_))
        ));
        assert!(host.calls().is_empty());

        let gone = Item::new(ItemKind::Tab, "404", "Gone", "https://gone.example");
        assert!(matches!(page.click(&gone).await, Err(CoreError::Host(_))));
        assert_eq!(host.calls(), vec![HostCall::ActivateTab(404)]);
    }

    #[tokio::test]
    async fn test_key_press_enter_and_space_only() {
        let (host, page) = mounted(LoadPolicy::AllOrNothing).await;
        let bookmark = find(&page, ItemKind::Bookmark);

        assert_eq!(page.key_press(&bookmark, "a").await.unwrap(), None);
        assert_eq!(page.key_press(&bookmark, "Tab").await.unwrap(), None);
        assert!(host.calls().is_empty());

        assert!(page.key_press(&bookmark, "Enter").await.unwrap().is_some());
        assert!(page.key_press(&bookmark, " ").await.unwrap().is_some());
        assert_eq!(host.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_open_project_page() {
        let (host, page) = mounted(LoadPolicy::AllOrNothing).await;
        page.open_project_page().await.unwrap();
        assert_eq!(
            host.calls(),
            vec![HostCall::OpenTab("https://github.com/omnitab/omnitab".to_string())]
        );
        assert_eq!(page.search_placeholder(), "Search...");
    }

    /// Each read waits until all five have started
    struct RendezvousHost {
        barrier: Barrier,
        seen_query: parking_lot::Mutex<Option<HistoryQuery>>,
    }

    impl RendezvousHost {
        async fn meet(&self) {
            self.barrier.wait().await;
        }
    }

    #[async_trait]
    impl BookmarkReader for RendezvousHost {
        async fn bookmark_tree(&self) -> omnitab_host::Result<Vec<BookmarkNode>> {
            self.meet().await;
            Ok(vec![BookmarkNode::link("b", "B", "https://b.example")])
        }
    }

    #[async_trait]
    impl TabLister for RendezvousHost {
        async fn current_window_tabs(&self) -> omnitab_host::Result<Vec<HostTab>> {
            self.meet().await;
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ClosedSessionLister for RendezvousHost {
        async fn recently_closed(&self) -> omnitab_host::Result<Vec<ClosedSession>> {
            self.meet().await;
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl HistorySearcher for RendezvousHost {
        async fn search_history(
            &self,
            query: &HistoryQuery,
        ) -> omnitab_host::Result<Vec<HistoryItem>> {
            *self.seen_query.lock() = Some(query.clone());
            self.meet().await;
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl TopSitesReader for RendezvousHost {
        async fn top_sites(&self) -> omnitab_host::Result<Vec<TopSite>> {
            self.meet().await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_reads_are_issued_concurrently() {
        let reads = Arc::new(RendezvousHost {
            barrier: Barrier::new(5),
            seen_query: parking_lot::Mutex::new(None),
        });
        let writes = Arc::new(MemoryHost::new());
        let apis = HostApis {
            bookmarks: reads.clone(),
            tabs: reads.clone(),
            sessions: reads.clone(),
            history: reads.clone(),
            top_sites: reads.clone(),
            activator: writes.clone(),
            restorer: writes.clone(),
            opener: writes,
        };

        let page = tokio::time::timeout(
            Duration::from_secs(5),
            NewTabPage::mount(apis, config(LoadPolicy::AllOrNothing)),
        )
        .await
        .expect("sequential reads would never pass the barrier");

        assert_eq!(page.items().len(), 1);
        assert_eq!(*reads.seen_query.lock(), Some(HistoryQuery::new("", 1000)));
    }

    #[tokio::test]
    async fn test_end_to_end_with_sqlite_host() {
        let sqlite = SqliteHostFixture::new().await;
        let page = NewTabPage::mount(
            HostApis::from_host(sqlite.host.clone()),
            config(LoadPolicy::AllOrNothing),
        )
        .await;

        let kinds: Vec<_> = page.items().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Bookmark,
                ItemKind::Tab,
                ItemKind::Session,
                ItemKind::History,
                ItemKind::TopSite
            ]
        );

        let session = find(&page, ItemKind::Session);
        page.click(&session).await.unwrap();

        let reloaded = NewTabPage::mount(
            HostApis::from_host(sqlite.host.clone()),
            config(LoadPolicy::AllOrNothing),
        )
        .await;
        let tabs = reloaded
            .items()
            .iter()
            .filter(|i| i.kind == ItemKind::Tab)
            .count();
        assert_eq!(tabs, 2);
        assert!(reloaded.items().iter().all(|i| i.kind != ItemKind::Session));
    }

    struct SqliteHostFixture {
        host: Arc<omnitab_storage::SqliteHost>,
    }

    impl SqliteHostFixture {
        async fn new() -> Self {
            let db = omnitab_storage::Database::open_in_memory().unwrap();
            let host = omnitab_storage::SqliteHost::new(db);

            let folder = host.add_bookmark(None, "Reading", None).unwrap();
            host.add_bookmark(Some(folder.as_str()), "Blog", Some("https://blog.example"))
                .unwrap();
            host.record_visit("https://docs.rs", "Docs").unwrap();

            host.open_tab("https://keep.example").await.unwrap();
            host.open_tab("https://closed.example").await.unwrap();
            let closing = host.current_window_tabs().await.unwrap()[1].id.unwrap();
            host.close_tab(closing).unwrap();

            Self {
                host: Arc::new(host),
            }
        }
    }
}
