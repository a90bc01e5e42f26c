//! Concurrent source loading
//!
//! The five reads are issued together on the current task. `fetch_all`
//! fails as soon as any read fails; `fetch_each` waits for every read and
//! keeps whatever succeeded.

use omnitab_host::{DataSource, HistoryQuery, HostApis, HostError};
use omnitab_items::SourceBatch;

use crate::error::CoreError;
use crate::Result;

pub async fn fetch_all(apis: &HostApis, history_query: &HistoryQuery) -> Result<SourceBatch> {
    let (bookmarks, tabs, sessions, history, top_sites) = tokio::try_join!(
        async {
            apis.bookmarks
                .bookmark_tree()
                .await
                .map_err(CoreError::fetch(DataSource::Bookmarks))
        },
        async {
            apis.tabs
                .current_window_tabs()
                .await
                .map_err(CoreError::fetch(DataSource::Tabs))
        },
        async {
            apis.sessions
                .recently_closed()
                .await
                .map_err(CoreError::fetch(DataSource::Sessions))
        },
        async {
            apis.history
                .search_history(history_query)
                .await
                .map_err(CoreError::fetch(DataSource::History))
        },
        async {
            apis.top_sites
                .top_sites()
                .await
                .map_err(CoreError::fetch(DataSource::TopSites))
        },
    )?;

    Ok(SourceBatch {
        bookmarks,
        tabs,
        sessions,
        history,
        top_sites,
    })
}

/// Per-source variant; failed sources stay empty and are returned alongside
pub async fn fetch_each(
    apis: &HostApis,
    history_query: &HistoryQuery,
) -> (SourceBatch, Vec<CoreError>) {
    let (bookmarks, tabs, sessions, history, top_sites) = tokio::join!(
        apis.bookmarks.bookmark_tree(),
        apis.tabs.current_window_tabs(),
        apis.sessions.recently_closed(),
        apis.history.search_history(history_query),
        apis.top_sites.top_sites(),
    );

    let mut errors = Vec::new();
    let batch = SourceBatch {
        bookmarks: keep(DataSource::Bookmarks, bookmarks, &mut errors),
        tabs: keep(DataSource::Tabs, tabs, &mut errors),
        sessions: keep(DataSource::Sessions, sessions, &mut errors),
        history: keep(DataSource::History, history, &mut errors),
        top_sites: keep(DataSource::TopSites, top_sites, &mut errors),
    };

    (batch, errors)
}

fn keep<T>(
    data_source: DataSource,
    result: std::result::Result<Vec<T>, HostError>,
    errors: &mut Vec<CoreError>,
) -> Vec<T> {
    result.unwrap_or_else(|error| {
        errors.push(CoreError::Fetch { data_source, error });
        Vec::new()
    })
}
