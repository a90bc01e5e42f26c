//! Omnitab Host
//!
//! The page never talks to the browser directly. Everything it reads or
//! triggers goes through the capability set defined here:
//! - five read collaborators (bookmarks, tabs, closed sessions, history, top sites)
//! - three write collaborators (activate tab, restore session, open tab)

mod capabilities;
mod error;
mod memory;
mod records;

pub use capabilities::{
    BookmarkReader, ClosedSessionLister, HistorySearcher, Host, HostApis, SessionRestorer,
    TabActivator, TabLister, TabOpener, TopSitesReader,
};
pub use error::HostError;
pub use memory::{HostCall, MemoryHost};
pub use records::{
    BookmarkNode, ClosedSession, ClosedWindow, DataSource, HistoryItem, HistoryQuery, HostTab,
    SessionTab, TopSite,
};

pub type Result<T> = std::result::Result<T, HostError>;
