//! Page-number pagination primitives shared by microblog feed endpoints.
//!
//! Feeds are paged by a 1-based page number and a fixed page size. A request
//! past the last page is not an error: it yields an empty page that still
//! links back to its predecessor, so stale bookmarks degrade gracefully.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::from_query(Some("2"), 3).expect("valid page size");
//! assert_eq!(request.offset(), 3);
//!
//! let page = Page::new(request, vec!["d", "e", "f"], 7);
//! assert_eq!(page.pages(), 3);
//! assert_eq!(page.next_num(), Some(3));
//! assert_eq!(page.prev_num(), Some(1));
//! ```

use serde::Serialize;
use thiserror::Error;

/// First page number; lower or unparsable page numbers are clamped to it.
pub const FIRST_PAGE: u32 = 1;

/// Query-string key carrying the page number.
pub const PAGE_QUERY_KEY: &str = "page";

/// Errors raised when a page request cannot be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// Validated page selection.
///
/// ## Invariants
/// - `page >= 1`
/// - `per_page >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a request, clamping `page` to [`FIRST_PAGE`].
    ///
    /// # Errors
    /// Returns [`PageRequestError::ZeroPageSize`] when `per_page` is zero.
    pub fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        if per_page == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        Ok(Self {
            page: page.max(FIRST_PAGE),
            per_page,
        })
    }

    /// Build a request from a raw `?page=` query value.
    ///
    /// Missing, blank, negative or non-numeric values select the first page;
    /// values larger than `u32::MAX` select the last representable page.
    ///
    /// # Errors
    /// Returns [`PageRequestError::ZeroPageSize`] when `per_page` is zero.
    pub fn from_query(raw: Option<&str>, per_page: u32) -> Result<Self, PageRequestError> {
        let page = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map_or(FIRST_PAGE, |value| {
                u32::try_from(value.max(i64::from(FIRST_PAGE))).unwrap_or(u32::MAX)
            });
        Self::new(page, per_page)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - FIRST_PAGE) * u64::from(self.per_page)
    }

    /// Number of items to fetch for this page.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// One page of items plus the totals needed for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the items fetched for `request` and the total
    /// number of matching items.
    #[must_use]
    pub fn new(request: PageRequest, items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Configured page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages; zero when there are no items at all.
    #[must_use]
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page))
    }

    /// Whether a following page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages()
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > FIRST_PAGE
    }

    /// Number of the following page, if any.
    #[must_use]
    pub fn next_num(&self) -> Option<u32> {
        if self.has_next() {
            self.page.checked_add(1)
        } else {
            None
        }
    }

    /// Number of the preceding page, if any.
    #[must_use]
    pub const fn prev_num(&self) -> Option<u32> {
        if self.has_prev() {
            Some(self.page - 1)
        } else {
            None
        }
    }

    /// Navigation links relative to `base_path`.
    #[must_use]
    pub fn links(&self, base_path: &str) -> PageLinks {
        PageLinks {
            next: self.next_num().map(|page| page_link(base_path, page)),
            prev: self.prev_num().map(|page| page_link(base_path, page)),
        }
    }

    /// Transform every item, keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// Previous/next links for a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// Link to the following page.
    pub next: Option<String>,
    /// Link to the preceding page.
    pub prev: Option<String>,
}

/// Build `base_path?page=N`.
///
/// ```
/// assert_eq!(pagination::page_link("/explore", 2), "/explore?page=2");
/// ```
#[must_use]
pub fn page_link(base_path: &str, page: u32) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(PAGE_QUERY_KEY, &page.to_string())
        .finish();
    format!("{base_path}?{query}")
}
