//! Continuation-link pagination.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Opaque reference to the next page. `None` on the last page.
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_link: Option<String>) -> Self {
        Self { items, next_link }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Follow continuation links from `first` until a page has none.
///
/// Pages are fetched one at a time, each with the link carried by the
/// previous page, and their items are appended in fetch order. Items are
/// neither cached nor deduplicated. The first fetch error aborts the walk and
/// is returned unchanged.
pub async fn walk<T, E, F, Fut>(first: Page<T>, mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let Page {
        items: mut collected,
        mut next_link,
    } = first;

    while let Some(link) = next_link.take() {
        let page = fetch_page(link).await?;
        collected.extend(page.items);
        next_link = page.next_link;
    }

    Ok(collected)
}
