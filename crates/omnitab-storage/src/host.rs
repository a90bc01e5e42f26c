//! SQLite host
//!
//! Implements every host capability on top of `Database`. The extra
//! methods (`add_bookmark`, `record_visit`, `close_tab`, `close_window`)
//! are how state gets in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use omnitab_host::{
    BookmarkNode, BookmarkReader, ClosedSession, ClosedSessionLister, ClosedWindow,
    HistoryItem, HistoryQuery, HistorySearcher, HostTab, SessionRestorer, SessionTab,
    TabActivator, TabLister, TabOpener, TopSite, TopSitesReader,
};

use crate::database::Database;
use crate::error::StorageError;
use crate::Result;

/// Closed sessions kept, oldest dropped first
const MAX_CLOSED_SESSIONS: usize = 25;

const TOP_SITES_LIMIT: usize = 10;

const KIND_TAB: &str = "tab";
const KIND_WINDOW: &str = "window";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTab {
    title: String,
    url: String,
}

fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| StorageError::InvalidUrl(format!("{url}: {e}")))
}

#[derive(Clone)]
pub struct SqliteHost {
    db: Database,
}

impl SqliteHost {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Add a bookmark, or a folder when `url` is `None`. Returns the new id.
    pub fn add_bookmark(
        &self,
        parent_id: Option<&str>,
        title: &str,
        url: Option<&str>,
    ) -> Result<String> {
        if let Some(url) = url {
            validate_url(url)?;
        }

        let id = Uuid::new_v4().to_string();
        self.db.with_connection(|conn| {
            if let Some(parent) = parent_id {
                // Only folders (no url) can hold children
                let parent_url: Option<Option<String>> = conn
                    .query_row("SELECT url FROM bookmarks WHERE id = ?1", [parent], |row| {
                        row.get(0)
                    })
                    .optional()?;
                if !matches!(parent_url, Some(None)) {
                    return Err(StorageError::NotFound(format!("bookmark folder {parent}")));
                }
            }

            let position: i64 = conn.query_row(
                "SELECT COUNT(*) FROM bookmarks WHERE parent_id IS ?1",
                [parent_id],
                |row| row.get(0),
            )?;

            conn.execute(
                "INSERT INTO bookmarks (id, parent_id, title, url, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, parent_id, title, url, position, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })?;

        tracing::debug!(bookmark_id = %id, "Added bookmark");
        Ok(id)
    }

    /// Record a visit to a URL
    pub fn record_visit(&self, url: &str, title: &str) -> Result<()> {
        self.db.with_connection(|conn| {
            let existing: Option<i64> = conn
                .query_row("SELECT id FROM history WHERE url = ?1", [url], |row| {
                    row.get(0)
                })
                .optional()?;

            if let Some(id) = existing {
                conn.execute(
                    "UPDATE history
                     SET title = CASE WHEN ?1 != '' THEN ?1 ELSE title END,
                         visited_at = ?2,
                         visit_count = visit_count + 1
                     WHERE id = ?3",
                    params![title, Utc::now().to_rfc3339(), id],
                )?;
            } else {
                conn.execute(
                    "INSERT INTO history (url, title, visited_at, visit_count) VALUES (?1, ?2, ?3, 1)",
                    params![url, title, Utc::now().to_rfc3339()],
                )?;
            }

            Ok(())
        })
    }

    /// Close an open tab and keep it as a restorable session.
    /// Returns the session id.
    pub fn close_tab(&self, tab_id: i64) -> Result<String> {
        let session_id = Uuid::new_v4().to_string();

        self.db.transaction(|conn| {
            let tab: Option<StoredTab> = conn
                .query_row(
                    "SELECT title, url FROM tabs WHERE id = ?1",
                    [tab_id],
                    |row| {
                        Ok(StoredTab {
                            title: row.get(0)?,
                            url: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            let tab = tab.ok_or_else(|| StorageError::NotFound(format!("tab {tab_id}")))?;

            conn.execute("DELETE FROM tabs WHERE id = ?1", [tab_id])?;
            Self::archive(conn, &session_id, KIND_TAB, &[tab])
        })?;

        tracing::info!(tab_id, session_id = %session_id, "Closed tab");
        Ok(session_id)
    }

    /// Close every open tab as one window session. Returns the session id.
    pub fn close_window(&self) -> Result<String> {
        let session_id = Uuid::new_v4().to_string();

        self.db.transaction(|conn| {
            let mut stmt = conn.prepare("SELECT title, url FROM tabs ORDER BY id")?;
            let tabs: Vec<StoredTab> = stmt
                .query_map([], |row| {
                    Ok(StoredTab {
                        title: row.get(0)?,
                        url: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;
            if tabs.is_empty() {
                return Err(StorageError::NotFound("open tabs".to_string()));
            }

            conn.execute("DELETE FROM tabs", [])?;
            Self::archive(conn, &session_id, KIND_WINDOW, &tabs)
        })?;

        tracing::info!(session_id = %session_id, "Closed window");
        Ok(session_id)
    }

    fn archive(conn: &Connection, session_id: &str, kind: &str, tabs: &[StoredTab]) -> Result<()> {
        conn.execute(
            "INSERT INTO closed_sessions (id, kind, tabs, closed_at) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, kind, serde_json::to_string(tabs)?, Utc::now().to_rfc3339()],
        )?;

        conn.execute(
            "DELETE FROM closed_sessions WHERE id NOT IN (
                 SELECT id FROM closed_sessions ORDER BY closed_at DESC, rowid DESC LIMIT ?1
             )",
            [MAX_CLOSED_SESSIONS as i64],
        )?;
        Ok(())
    }

    fn insert_tab(conn: &Connection, title: &str, url: &str, active: bool) -> Result<i64> {
        if active {
            conn.execute("UPDATE tabs SET is_active = 0", [])?;
        }
        conn.execute(
            "INSERT INTO tabs (url, title, is_active, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![url, title, active as i32, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn load_bookmarks(&self) -> Result<Vec<BookmarkNode>> {
        struct Row {
            id: String,
            parent_id: Option<String>,
            title: String,
            url: Option<String>,
        }

        let rows: Vec<Row> = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, parent_id, title, url FROM bookmarks ORDER BY position, created_at",
            )?;
            let rows: Vec<Row> = stmt
                .query_map([], |row| {
                    Ok(Row {
                        id: row.get(0)?,
                        parent_id: row.get(1)?,
                        title: row.get(2)?,
                        url: row.get(3)?,
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;
            Ok(rows)
        })?;

        let mut children: HashMap<Option<String>, Vec<Row>> = HashMap::new();
        for row in rows {
            children.entry(row.parent_id.clone()).or_default().push(row);
        }

        fn build(
            parent: Option<String>,
            children: &mut HashMap<Option<String>, Vec<Row>>,
        ) -> Vec<BookmarkNode> {
            children
                .remove(&parent)
                .unwrap_or_default()
                .into_iter()
                .map(|row| {
                    let nested = build(Some(row.id.clone()), children);
                    BookmarkNode {
                        children: row.url.is_none().then_some(nested),
                        id: row.id,
                        title: row.title,
                        url: row.url,
                    }
                })
                .collect()
        }

        Ok(build(None, &mut children))
    }

    fn load_tabs(&self) -> Result<Vec<HostTab>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, url, is_active FROM tabs ORDER BY id")?;
            let tabs: Vec<HostTab> = stmt
                .query_map([], |row| {
                    Ok(HostTab {
                        id: Some(row.get(0)?),
                        title: Some(row.get(1)?),
                        url: Some(row.get(2)?),
                        active: row.get::<_, i32>(3)? != 0,
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;
            Ok(tabs)
        })
    }

    fn load_closed_sessions(&self) -> Result<Vec<ClosedSession>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, tabs, closed_at FROM closed_sessions
                 ORDER BY closed_at DESC, rowid DESC
                 LIMIT ?1",
            )?;
            let rows: Vec<(String, String, String, String)> = stmt
                .query_map([MAX_CLOSED_SESSIONS as i64], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<rusqlite::Result<_>>()?;

            let mut sessions = Vec::with_capacity(rows.len());
            for (id, kind, tabs_json, closed_at) in rows {
                let tabs: Vec<StoredTab> = serde_json::from_str(&tabs_json)?;
                let last_modified = parse_time(&closed_at).timestamp();
                let mut tabs = tabs.into_iter().map(|t| SessionTab {
                    session_id: None,
                    title: Some(t.title),
                    url: Some(t.url),
                });

                let session = if kind == KIND_WINDOW {
                    ClosedSession {
                        last_modified,
                        tab: None,
                        window: Some(ClosedWindow {
                            session_id: Some(id),
                            tabs: tabs.collect(),
                        }),
                    }
                } else {
                    let tab = tabs.next().map(|t| SessionTab {
                        session_id: Some(id),
                        ..t
                    });
                    ClosedSession {
                        last_modified,
                        tab,
                        window: None,
                    }
                };
                sessions.push(session);
            }
            Ok(sessions)
        })
    }

    fn query_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>> {
        self.db.with_connection(|conn| {
            let pattern = format!("%{}%", query.text.to_lowercase());

            let mut stmt = conn.prepare(
                "SELECT id, url, title, visited_at, visit_count FROM history
                 WHERE LOWER(url) LIKE ?1 OR LOWER(title) LIKE ?1
                 ORDER BY visited_at DESC, visit_count DESC
                 LIMIT ?2",
            )?;

            let entries: Vec<HistoryItem> = stmt
                .query_map(params![pattern, query.max_results as i64], |row| {
                    let visited_str: String = row.get(3)?;
                    Ok(HistoryItem {
                        id: row.get::<_, i64>(0)?.to_string(),
                        url: Some(row.get(1)?),
                        title: Some(row.get(2)?),
                        last_visit_time: Some(parse_time(&visited_str).timestamp_millis() as f64),
                        visit_count: Some(row.get(4)?),
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;

            Ok(entries)
        })
    }

    fn query_top_sites(&self) -> Result<Vec<TopSite>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT url, title FROM history
                 ORDER BY visit_count DESC, visited_at DESC
                 LIMIT ?1",
            )?;
            let sites: Vec<TopSite> = stmt
                .query_map([TOP_SITES_LIMIT as i64], |row| {
                    let url: String = row.get(0)?;
                    let title: String = row.get(1)?;
                    Ok(TopSite {
                        title: if title.is_empty() { url.clone() } else { title },
                        url,
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;
            Ok(sites)
        })
    }

    fn activate(&self, tab_id: i64) -> Result<()> {
        self.db.transaction(|conn| {
            let exists: Option<i64> = conn
                .query_row("SELECT id FROM tabs WHERE id = ?1", [tab_id], |row| row.get(0))
                .optional()?;
            if exists.is_none() {
                return Err(StorageError::NotFound(format!("tab {tab_id}")));
            }

            conn.execute(
                "UPDATE tabs SET is_active = CASE WHEN id = ?1 THEN 1 ELSE 0 END",
                [tab_id],
            )?;
            Ok(())
        })?;

        tracing::info!(tab_id, "Activated tab");
        Ok(())
    }

    fn restore(&self, session_id: &str) -> Result<()> {
        let restored = self.db.transaction(|conn| {
            let tabs_json: Option<String> = conn
                .query_row(
                    "SELECT tabs FROM closed_sessions WHERE id = ?1",
                    [session_id],
                    |row| row.get(0),
                )
                .optional()?;
            let tabs_json =
                tabs_json.ok_or_else(|| StorageError::NotFound(format!("session {session_id}")))?;
            let tabs: Vec<StoredTab> = serde_json::from_str(&tabs_json)?;

            for tab in &tabs {
                Self::insert_tab(conn, &tab.title, &tab.url, false)?;
            }
            conn.execute("DELETE FROM closed_sessions WHERE id = ?1", [session_id])?;
            Ok(tabs.len())
        })?;

        tracing::info!(session_id = %session_id, tabs = restored, "Restored session");
        Ok(())
    }

    fn open(&self, url: &str) -> Result<i64> {
        validate_url(url)?;
        let id = self.db.transaction(|conn| Self::insert_tab(conn, "", url, true))?;

        tracing::info!(tab_id = id, url = %url, "Opened tab");
        Ok(id)
    }
}

#[async_trait]
impl BookmarkReader for SqliteHost {
    async fn bookmark_tree(&self) -> omnitab_host::Result<Vec<BookmarkNode>> {
        Ok(self.load_bookmarks()?)
    }
}

#[async_trait]
impl TabLister for SqliteHost {
    async fn current_window_tabs(&self) -> omnitab_host::Result<Vec<HostTab>> {
        Ok(self.load_tabs()?)
    }
}

#[async_trait]
impl ClosedSessionLister for SqliteHost {
    async fn recently_closed(&self) -> omnitab_host::Result<Vec<ClosedSession>> {
        Ok(self.load_closed_sessions()?)
    }
}

#[async_trait]
impl HistorySearcher for SqliteHost {
    async fn search_history(&self, query: &HistoryQuery) -> omnitab_host::Result<Vec<HistoryItem>> {
        Ok(self.query_history(query)?)
    }
}

#[async_trait]
impl TopSitesReader for SqliteHost {
    async fn top_sites(&self) -> omnitab_host::Result<Vec<TopSite>> {
        Ok(self.query_top_sites()?)
    }
}

#[async_trait]
impl TabActivator for SqliteHost {
    async fn activate_tab(&self, tab_id: i64) -> omnitab_host::Result<()> {
        Ok(self.activate(tab_id)?)
    }
}

#[async_trait]
impl SessionRestorer for SqliteHost {
    async fn restore_session(&self, session_id: &str) -> omnitab_host::Result<()> {
        Ok(self.restore(session_id)?)
    }
}

#[async_trait]
impl TabOpener for SqliteHost {
    async fn open_tab(&self, url: &str) -> omnitab_host::Result<()> {
        self.open(url)?;
        Ok(())
    }
}
