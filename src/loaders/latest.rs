//! Latest-articles widget: the newest articles in a fixed grid.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::render::{Document, LatestGridView, Renderer};
use crate::types::ArticleSlot;

use super::SiteLoader;

/// Viewport geometry at the time of a scroll event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top of the page
    pub scroll_y: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
    /// Offset of the widget's section from the top of the page
    pub section_offset: f64,
}

impl ScrollPosition {
    /// Whether the bottom of the viewport has passed the top of the section
    pub fn reaches_section(&self) -> bool {
        self.scroll_y + self.viewport_height > self.section_offset
    }
}

/// The latest-articles grid and its load-once latch
///
/// The latch belongs to this widget instance: a fresh widget (a fresh page)
/// loads again, while repeated scroll events on the same widget dispatch at
/// most one load.
pub struct LatestArticlesWidget {
    site: SiteLoader,
    view: LatestGridView,
    loaded: AtomicBool,
}

impl LatestArticlesWidget {
    /// Widget rendering into `document` with the configured grid size
    pub fn new(site: SiteLoader, document: Arc<dyn Document>) -> Self {
        let layout = &site.config().layout;
        let view = LatestGridView::new(document, layout.latest_count, layout.grid_columns);
        Self {
            site,
            view,
            loaded: AtomicBool::new(false),
        }
    }

    /// Whether a load has been dispatched
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Grid view this widget renders into
    pub fn view(&self) -> &LatestGridView {
        &self.view
    }

    /// Handle a scroll event
    ///
    /// The first event that reaches the section spawns the load and returns
    /// its handle; every other event returns `None` without fetching.
    pub fn on_scroll(self: &Arc<Self>, position: ScrollPosition) -> Option<JoinHandle<Result<Vec<ArticleSlot>>>> {
        if !position.reaches_section() {
            return None;
        }
        if self
            .loaded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("latest articles already loading");
            return None;
        }

        let widget = Arc::clone(self);
        Some(tokio::spawn(async move { widget.load().await }))
    }

    /// Fetch the newest articles and render them, newest first
    ///
    /// Loads unconditionally; use [`on_scroll`](Self::on_scroll) for the
    /// latched, scroll-triggered path.
    pub async fn load(&self) -> Result<Vec<ArticleSlot>> {
        match self.latest_slots().await {
            Ok(slots) => {
                self.view.render(&slots);
                Ok(slots)
            }
            Err(e) => {
                warn!(error = %e, "latest articles failed");
                self.view.render_error();
                Err(e)
            }
        }
    }

    async fn latest_slots(&self) -> Result<Vec<ArticleSlot>> {
        let count = self.site.config().layout.latest_count;
        let index = self.site.fetch_index().await?;
        let ids = index.latest(count);

        let slots = self.site.load_slots(ids).await?;
        info!(
            articles = slots.len(),
            placeholders = slots.iter().filter(|s| s.is_placeholder()).count(),
            "latest articles loaded"
        );
        Ok(slots)
    }
}
