//! Writing fetched articles into the page
//!
//! Views render a complete ordered slot list in one pass. Every write
//! replaces an element's content, so rendering the same slots twice leaves
//! the page unchanged.

mod document;
pub mod templates;

use std::sync::Arc;

use crate::selection::PageLink;
use crate::types::{ArticleDetails, ArticleSlot};

pub use document::{Document, MemoryDocument};

/// Message shown when an archive page cannot be loaded
pub const ARCHIVE_ERROR: &str = "There was an error getting the articles. :(";
/// Message shown when the latest-articles widget cannot be loaded
pub const LATEST_ERROR: &str = "There was an error getting the latest articles. :(";
/// Message shown when a single article cannot be loaded
pub const ARTICLE_ERROR: &str = "There was an error getting the article. :(";

/// Turns one ordered slot list into page content
pub trait Renderer: Send + Sync {
    /// Render every slot, in order, replacing previous content
    fn render(&self, slots: &[ArticleSlot]);

    /// Replace the view with its page-level error message
    fn render_error(&self);
}

fn slot_markup(slot: &ArticleSlot) -> String {
    match slot {
        ArticleSlot::Article(record) => templates::preview_card(record),
        ArticleSlot::Placeholder { id, .. } => templates::placeholder_card(id),
    }
}

/// Archive listing: one column of cards plus page navigation
pub struct ArchiveView {
    document: Arc<dyn Document>,
}

impl ArchiveView {
    /// Element holding the article cards
    pub const ARTICLES: &'static str = "#articles";
    /// List holding the page navigation entries
    pub const PAGINATION: &'static str = ".pagination";

    /// View writing into `document`
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document }
    }

    /// Replace the page navigation
    pub fn render_pagination(&self, links: &[PageLink]) {
        let items: Vec<String> = links.iter().map(templates::pagination_item).collect();
        self.document
            .set_inner_html(Self::PAGINATION, &items.join("\n"));
    }
}

impl Renderer for ArchiveView {
    fn render(&self, slots: &[ArticleSlot]) {
        let cards: Vec<String> = slots.iter().map(slot_markup).collect();
        self.document.set_inner_html(Self::ARTICLES, &cards.join("\n"));
    }

    fn render_error(&self) {
        self.document
            .set_inner_html(Self::ARTICLES, &templates::error_message(ARCHIVE_ERROR));
    }
}

/// Latest-articles widget: a fixed grid filled row by row
///
/// Slot `i` always lands in cell `i`; cells past the last slot are cleared,
/// never back-filled from later slots.
pub struct LatestGridView {
    document: Arc<dyn Document>,
    cells: Vec<String>,
}

impl LatestGridView {
    /// Element replaced by the page-level error message
    pub const CONTAINER: &'static str = "#pages-section .container";

    /// Grid of `cells` cells laid out `columns` wide
    pub fn new(document: Arc<dyn Document>, cells: usize, columns: usize) -> Self {
        Self {
            document,
            cells: Self::cell_selectors(cells, columns),
        }
    }

    /// `#pages-section .row{r} .column{c}` for each cell, row-major, 1-based
    pub fn cell_selectors(cells: usize, columns: usize) -> Vec<String> {
        let columns = columns.max(1);
        (0..cells)
            .map(|i| {
                format!(
                    "#pages-section .row{} .column{}",
                    i / columns + 1,
                    i % columns + 1
                )
            })
            .collect()
    }

    /// Selectors of this view's cells
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

impl Renderer for LatestGridView {
    fn render(&self, slots: &[ArticleSlot]) {
        for (i, cell) in self.cells.iter().enumerate() {
            let html = slots.get(i).map(slot_markup).unwrap_or_default();
            self.document.set_inner_html(cell, &html);
        }
        if slots.len() > self.cells.len() {
            tracing::warn!(
                slots = slots.len(),
                cells = self.cells.len(),
                "more slots than grid cells, extra slots dropped"
            );
        }
    }

    fn render_error(&self) {
        self.document
            .set_inner_html(Self::CONTAINER, &templates::error_message(LATEST_ERROR));
    }
}

/// Single article page
pub struct ArticleView {
    document: Arc<dyn Document>,
}

impl ArticleView {
    /// Article title
    pub const TITLE: &'static str = "#title";
    /// Publication date
    pub const DATE: &'static str = "#date";
    /// Comma-separated keywords
    pub const KEYWORDS: &'static str = "#keywords";
    /// Last modification date
    pub const LAST_MODIFIED: &'static str = "#last-modified";
    /// Article body fragment
    pub const CONTENT: &'static str = "#article-content";
    /// Element replaced by the page-level error message
    pub const MAIN: &'static str = "main";

    /// View writing into `document`
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document }
    }

    /// Render metadata and the body fragment
    ///
    /// The body is trusted markup produced by the site build and is inserted
    /// as-is; every metadata field is inserted as text.
    pub fn render_article(&self, details: &ArticleDetails, body: &str) {
        self.document.set_text(Self::TITLE, &details.title);
        self.document.set_text(Self::DATE, &details.date.to_string());
        self.document
            .set_text(Self::KEYWORDS, &details.keywords.join(", "));
        let last_modified = details
            .last_modified
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        self.document.set_text(Self::LAST_MODIFIED, &last_modified);
        self.document.set_inner_html(Self::CONTENT, body);
    }

    /// Replace the page with its error message
    pub fn render_error(&self) {
        self.document
            .set_inner_html(Self::MAIN, &templates::error_message(ARTICLE_ERROR));
    }
}
