//! Omnitab Items
//!
//! Every source (bookmarks, tabs, closed sessions, history, top sites) is
//! normalized into one `Item` shape. The list is searched with a plain
//! case-insensitive substring filter and each item maps to exactly one
//! host action when clicked.

mod error;
mod filter;
mod item;
mod normalize;

pub use error::ItemError;
pub use filter::{filter_items, matches, strip_scheme};
pub use item::{Item, ItemAction, ItemKind};
pub use normalize::{
    flatten_bookmarks, history_items, session_items, tab_items, top_site_items, SourceBatch,
};

pub type Result<T> = std::result::Result<T, ItemError>;
