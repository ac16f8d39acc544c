//! Draining cursor-paginated listings
//!
//! Every provider listing has the same shape: call with an optional
//! continuation cursor, get a page of items plus (maybe) the next cursor.
//! The field names and "more data" signals differ per API, so each adapter
//! folds its own signal into [`Page::next`] and [`drain_pages`] does the
//! looping.

use anyhow::Result;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, warn};

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page, `None` when the listing is exhausted
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self { items, next }
    }

    /// A page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Build the continuation for APIs that signal more data with a
    /// truncation flag next to the marker (IAM, CloudFront).
    pub fn truncated(items: Vec<T>, is_truncated: bool, marker: Option<&str>) -> Self {
        let next = if is_truncated {
            marker.map(str::to_string)
        } else {
            None
        };
        Self { items, next }
    }
}

/// Items that can be de-duplicated while accumulating pages
pub trait PageItem {
    fn page_key(&self) -> &str;
}

impl PageItem for String {
    fn page_key(&self) -> &str {
        self
    }
}

/// Fetch every page of a listing and return all items in provider order.
///
/// `fetch` is called with `None` first and then with each returned cursor
/// until a page comes back without one. An empty-string cursor counts as
/// the end of the listing. A cursor that was already issued ends the loop,
/// and items whose key was already seen are dropped, so a provider that
/// repeats itself can't produce duplicates or spin forever.
///
/// Errors from `fetch` propagate unchanged; there is no retry.
pub async fn drain_pages<T, F, Fut>(what: &str, mut fetch: F) -> Result<Vec<T>>
where
    T: PageItem,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut seen_cursors: HashSet<String> = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(cursor.take()).await?;
        pages += 1;

        for item in page.items {
            if seen_keys.insert(item.page_key().to_string()) {
                items.push(item);
            } else {
                debug!(what, key = %item.page_key(), "Skipping item already listed");
            }
        }

        match page.next {
            Some(next) if !next.is_empty() => {
                if !seen_cursors.insert(next.clone()) {
                    warn!(what, cursor = %next, "Provider repeated a continuation cursor, stopping");
                    break;
                }
                cursor = Some(next);
            }
            _ => break,
        }
    }

    debug!(what, pages, count = items.len(), "Listing drained");
    Ok(items)
}
