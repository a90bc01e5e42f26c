//! Unified item record

use serde::{Deserialize, Serialize};

use crate::error::ItemError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Bookmark,
    Tab,
    Session,
    History,
    TopSite,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Bookmark => "bookmark",
            ItemKind::Tab => "tab",
            ItemKind::Session => "session",
            ItemKind::History => "history",
            ItemKind::TopSite => "topSite",
        }
    }

    /// Glyph shown in front of the row
    pub fn icon(&self) -> &'static str {
        match self {
            ItemKind::Bookmark => "🔖",
            ItemKind::Tab => "📄",
            ItemKind::Session => "🕑",
            ItemKind::History => "📜",
            ItemKind::TopSite => "⭐",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Bookmark => "bookmark",
            ItemKind::Tab => "tab",
            ItemKind::Session => "session",
            ItemKind::History => "history",
            ItemKind::TopSite => "top site",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the new-tab list, whatever its source.
///
/// `title` and `url` are always populated (possibly with a placeholder);
/// `session_id` is only set for session items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// What the host should do when an item is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    ActivateTab(i64),
    RestoreSession(String),
    OpenUrl(String),
}

impl Item {
    pub fn new(
        kind: ItemKind,
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            kind,
            session_id: None,
        }
    }

    /// List key; ids are only unique within one kind
    pub fn key(&self) -> String {
        format!("{}-{}", self.kind, self.id)
    }

    pub fn action(&self) -> Result<ItemAction> {
        match self.kind {
            ItemKind::Tab => self
                .id
                .parse::<i64>()
                .map(ItemAction::ActivateTab)
                .map_err(|_| ItemError::InvalidTabId(self.id.clone())),
            ItemKind::Session => self
                .session_id
                .clone()
                .map(ItemAction::RestoreSession)
                .ok_or_else(|| ItemError::MissingSessionId(self.key())),
            ItemKind::Bookmark | ItemKind::History | ItemKind::TopSite => {
                Ok(ItemAction::OpenUrl(self.url.clone()))
            }
        }
    }
}
