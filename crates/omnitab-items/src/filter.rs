//! Query filter
//!
//! Sessions match on title only. Everything else matches on
//! `"{title} {url}"` with `http://` and `https://` removed, so typing a
//! scheme never matches every row.

use crate::item::{Item, ItemKind};

/// Remove every `http://` and `https://` occurrence (case-sensitive).
pub fn strip_scheme(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(tail) = rest
            .strip_prefix("https://")
            .or_else(|| rest.strip_prefix("http://"))
        {
            rest = tail;
            continue;
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    out
}

pub fn matches(item: &Item, query: &str) -> bool {
    let query = query.to_lowercase();
    match item.kind {
        ItemKind::Session => item.title.to_lowercase().contains(&query),
        ItemKind::Bookmark | ItemKind::Tab | ItemKind::History | ItemKind::TopSite => {
            let text = strip_scheme(&format!("{} {}", item.title, item.url));
            text.to_lowercase().contains(&query)
        }
    }
}

/// Items matching `query`, in their original order
pub fn filter_items<'a>(items: &'a [Item], query: &str) -> Vec<&'a Item> {
    items.iter().filter(|item| matches(item, query)).collect()
}
