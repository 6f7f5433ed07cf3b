//! Archive page: one page of the index, oldest first.

use tracing::{info, warn};

use crate::error::Result;
use crate::render::{ArchiveView, Renderer};
use crate::selection::{pagination_links, parse_page_parameter};
use crate::types::ArticleSlot;

use super::SiteLoader;

impl SiteLoader {
    /// Load and render the archive page named by the `pagination` parameter
    ///
    /// Invalid parameters are rejected before any request is made. Any
    /// failure (bad parameter, index unavailable, page out of range, every
    /// article failed) replaces the listing with the archive error message.
    ///
    /// Returns the slots that were rendered.
    pub async fn load_archive_page(
        &self,
        page_param: Option<&str>,
        view: &ArchiveView,
    ) -> Result<Vec<ArticleSlot>> {
        match self.archive_page(page_param, view).await {
            Ok(slots) => {
                view.render(&slots);
                Ok(slots)
            }
            Err(e) => {
                warn!(page = ?page_param, error = %e, "archive page failed");
                view.render_error();
                Err(e)
            }
        }
    }

    async fn archive_page(
        &self,
        page_param: Option<&str>,
        view: &ArchiveView,
    ) -> Result<Vec<ArticleSlot>> {
        let page = parse_page_parameter(page_param)?;
        let page_size = self.config.layout.page_size;

        let index = self.fetch_index().await?;
        let links = pagination_links(index.page_count(page_size), page)?;
        let ids = index.page(page, page_size)?.to_vec();

        view.render_pagination(&links);

        let slots = self.load_slots(ids).await?;
        info!(
            page,
            articles = slots.len(),
            placeholders = slots.iter().filter(|s| s.is_placeholder()).count(),
            "archive page loaded"
        );
        Ok(slots)
    }
}
