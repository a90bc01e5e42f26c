//! Records returned by the host browser APIs
//!
//! Field names follow the extension API JSON (camelCase) so records can be
//! deserialized straight from a bridge payload. Anything the host may omit
//! is an `Option`.

use serde::{Deserialize, Serialize};

/// The five read-side data sources, in merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Bookmarks,
    Tabs,
    Sessions,
    History,
    TopSites,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Bookmarks => "bookmarks",
            DataSource::Tabs => "tabs",
            DataSource::Sessions => "sessions",
            DataSource::History => "history",
            DataSource::TopSites => "top_sites",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the bookmark tree. Folders have children and no url.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    pub fn link(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: Some(url.into()),
            children: None,
        }
    }

    pub fn folder(
        id: impl Into<String>,
        title: impl Into<String>,
        children: Vec<BookmarkNode>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: None,
            children: Some(children),
        }
    }
}

/// An open tab in the current window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTab {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Tab snapshot kept inside a closed-session record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTab {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedWindow {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub tabs: Vec<SessionTab>,
}

/// A recently closed tab or window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedSession {
    /// Seconds since the epoch
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub tab: Option<SessionTab>,
    #[serde(default)]
    pub window: Option<ClosedWindow>,
}

impl ClosedSession {
    pub fn closed_tab(session_id: impl Into<String>, title: &str, url: &str) -> Self {
        Self {
            last_modified: 0,
            tab: Some(SessionTab {
                session_id: Some(session_id.into()),
                title: Some(title.to_string()),
                url: Some(url.to_string()),
            }),
            window: None,
        }
    }

    pub fn closed_window(session_id: impl Into<String>, tabs: Vec<SessionTab>) -> Self {
        Self {
            last_modified: 0,
            tab: None,
            window: Some(ClosedWindow {
                session_id: Some(session_id.into()),
                tabs,
            }),
        }
    }

    /// Restore handle: the closed tab's id, else the closed window's.
    pub fn session_id(&self) -> Option<&str> {
        self.tab
            .as_ref()
            .and_then(|t| t.session_id.as_deref())
            .or_else(|| self.window.as_ref().and_then(|w| w.session_id.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub last_visit_time: Option<f64>,
    #[serde(default)]
    pub visit_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSite {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub text: String,
    pub max_results: usize,
}

impl HistoryQuery {
    pub fn new(text: impl Into<String>, max_results: usize) -> Self {
        Self {
            text: text.into(),
            max_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_prefers_tab() {
        let mut session = ClosedSession::closed_tab("t-1", "Docs", "https://docs.rs");
        session.window = Some(ClosedWindow {
            session_id: Some("w-1".to_string()),
            tabs: vec![],
        });
        assert_eq!(session.session_id(), Some("t-1"));
    }

    #[test]
    fn test_window_session_id() {
        let session = ClosedSession::closed_window(
            "w-2",
            vec![
                SessionTab {
                    session_id: None,
                    title: Some("First".to_string()),
                    url: Some("https://first.example".to_string()),
                },
                SessionTab::default(),
            ],
        );
        assert_eq!(session.session_id(), Some("w-2"));
    }

    #[test]
    fn test_empty_session_has_no_handle() {
        let session = ClosedSession::default();
        assert!(session.session_id().is_none());
    }
}
