//! Source normalization
//!
//! Turns raw host records into `Item`s. Fallback rules differ per source:
//! tabs and sessions treat an empty string as missing, history only
//! falls through when a field is absent.

use omnitab_host::{BookmarkNode, ClosedSession, HistoryItem, HostTab, TopSite};

use crate::item::{Item, ItemKind};

/// History placeholder so the row always has something to show
const HISTORY_PLACEHOLDER: &str = " ";

/// First value that is present and non-empty
fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

/// Depth-first, node before children. Folders emit nothing.
pub fn flatten_bookmarks(nodes: &[BookmarkNode]) -> Vec<Item> {
    fn walk(nodes: &[BookmarkNode], out: &mut Vec<Item>) {
        for node in nodes {
            if let Some(url) = node.url.as_deref().filter(|u| !u.is_empty()) {
                let title = if node.title.is_empty() {
                    url
                } else {
                    node.title.as_str()
                };
                out.push(Item::new(ItemKind::Bookmark, node.id.clone(), title, url));
            }
            if let Some(children) = &node.children {
                walk(children, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

pub fn tab_items(tabs: &[HostTab]) -> Vec<Item> {
    tabs.iter()
        .map(|tab| {
            let id = tab.id.map(|id| id.to_string()).unwrap_or_default();
            let title = first_non_empty([tab.title.as_deref(), tab.url.as_deref()]).unwrap_or("");
            let url = first_non_empty([tab.url.as_deref()]).unwrap_or("");
            Item::new(ItemKind::Tab, id, title, url)
        })
        .collect()
}

/// Title and url come from the closed tab, else the closed window's first tab.
pub fn session_items(sessions: &[ClosedSession]) -> Vec<Item> {
    sessions
        .iter()
        .map(|session| {
            let window_first = session.window.as_ref().and_then(|w| w.tabs.first());
            let tab = session.tab.as_ref();

            let title = first_non_empty([
                tab.and_then(|t| t.title.as_deref()),
                window_first.and_then(|t| t.title.as_deref()),
            ])
            .unwrap_or("");
            let url = first_non_empty([
                tab.and_then(|t| t.url.as_deref()),
                window_first.and_then(|t| t.url.as_deref()),
            ])
            .unwrap_or("");

            let session_id = session.session_id().map(str::to_string);
            let mut item = Item::new(
                ItemKind::Session,
                session_id.clone().unwrap_or_default(),
                title,
                url,
            );
            item.session_id = session_id;
            item
        })
        .collect()
}

pub fn history_items(history: &[HistoryItem]) -> Vec<Item> {
    history
        .iter()
        .map(|entry| {
            let title = entry
                .title
                .as_deref()
                .or(entry.url.as_deref())
                .unwrap_or(HISTORY_PLACEHOLDER);
            let url = entry.url.as_deref().unwrap_or(HISTORY_PLACEHOLDER);
            Item::new(ItemKind::History, entry.id.clone(), title, url)
        })
        .collect()
}

pub fn top_site_items(sites: &[TopSite]) -> Vec<Item> {
    sites
        .iter()
        .map(|site| {
            Item::new(
                ItemKind::TopSite,
                site.url.clone(),
                site.title.clone(),
                site.url.clone(),
            )
        })
        .collect()
}

/// Raw results of the five host reads
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub bookmarks: Vec<BookmarkNode>,
    pub tabs: Vec<HostTab>,
    pub sessions: Vec<ClosedSession>,
    pub history: Vec<HistoryItem>,
    pub top_sites: Vec<TopSite>,
}

impl SourceBatch {
    /// Normalize and merge: bookmarks, tabs, sessions, history, top sites
    pub fn into_items(self) -> Vec<Item> {
        let mut items = flatten_bookmarks(&self.bookmarks);
        items.extend(tab_items(&self.tabs));
        items.extend(session_items(&self.sessions));
        items.extend(history_items(&self.history));
        items.extend(top_site_items(&self.top_sites));

        tracing::debug!(total = items.len(), "Normalized source batch");
        items
    }
}
