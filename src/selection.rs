//! Choosing which articles a view shows
//!
//! The index document lists article ids oldest first. Archive pages slice it
//! front to back; the latest-articles widget takes its tail and reverses it
//! so the newest article comes first. Selection is purely positional: two
//! entries never tie because no two share a position.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SelectionError;
use crate::types::ArticleId;

#[allow(clippy::expect_used)]
static PAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("page pattern compiles"));

/// Every published article id, oldest first
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleIndex(Vec<ArticleId>);

impl ArticleIndex {
    /// Wrap an already ordered id list
    pub fn new(ids: Vec<ArticleId>) -> Self {
        Self(ids)
    }

    /// Number of articles
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the index lists no articles
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All ids, oldest first
    pub fn ids(&self) -> &[ArticleId] {
        &self.0
    }

    /// Number of archive pages for `page_size` articles per page
    pub fn page_count(&self, page_size: usize) -> usize {
        page_count(self.0.len(), page_size)
    }

    /// Ids shown on 1-based archive `page`
    pub fn page(&self, page: usize, page_size: usize) -> Result<&[ArticleId], SelectionError> {
        page_slice(&self.0, page, page_size)
    }

    /// The newest `count` ids, newest first
    pub fn latest(&self, count: usize) -> Vec<ArticleId> {
        latest(&self.0, count)
    }
}

/// Parse the `pagination` query parameter
///
/// Accepts only ASCII digits (`^[0-9]+$`) denoting a number greater than zero.
pub fn parse_page_parameter(raw: Option<&str>) -> Result<usize, SelectionError> {
    let raw = raw.ok_or_else(|| SelectionError::InvalidPageParameter(String::new()))?;
    if !PAGE_PATTERN.is_match(raw) {
        return Err(SelectionError::InvalidPageParameter(raw.to_string()));
    }
    match raw.parse::<usize>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(SelectionError::InvalidPageParameter(raw.to_string())),
    }
}

/// `ceil(len / page_size)`; zero when `page_size` is zero
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Items `[page_size * (page - 1), page_size * page)`, clamped to the end
///
/// A page past the last one is an error rather than an empty slice. The
/// single exception is page 1 of an empty list, which is an empty page.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> Result<&[T], SelectionError> {
    if page == 0 || page_size == 0 {
        return Err(SelectionError::InvalidPageParameter(page.to_string()));
    }
    if items.is_empty() && page == 1 {
        return Ok(items);
    }

    let pages = page_count(items.len(), page_size);
    if page > pages {
        return Err(SelectionError::PageOutOfRange { page, pages });
    }

    let start = page_size * (page - 1);
    let end = (start + page_size).min(items.len());
    Ok(&items[start..end])
}

/// The last `count` items, newest (last) first
pub fn latest<T: Clone>(items: &[T], count: usize) -> Vec<T> {
    let start = items.len().saturating_sub(count);
    items[start..].iter().rev().cloned().collect()
}

/// One entry of the archive page navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// 1-based page number
    pub number: usize,
    /// Whether this is the page being shown
    pub active: bool,
}

/// Navigation entries `1..=pages` with exactly `active` marked
pub fn pagination_links(pages: usize, active: usize) -> Result<Vec<PageLink>, SelectionError> {
    if active == 0 || active > pages.max(1) {
        return Err(SelectionError::PageOutOfRange {
            page: active,
            pages,
        });
    }
    Ok((1..=pages)
        .map(|number| PageLink {
            number,
            active: number == active,
        })
        .collect())
}
