//! Single article page: metadata plus body fragment.

use tracing::{info, warn};

use crate::error::Result;
use crate::render::ArticleView;
use crate::types::{ArticleDetails, ArticleId};

use super::SiteLoader;

impl SiteLoader {
    /// Load and render the article named by the `article` parameter
    ///
    /// The metadata document and the HTML body are fetched concurrently. If
    /// the identifier is invalid no request is made; if either fetch fails
    /// the page shows the article error message.
    pub async fn load_article(
        &self,
        article_param: Option<&str>,
        view: &ArticleView,
    ) -> Result<ArticleDetails> {
        match self.article_page(article_param).await {
            Ok((details, body)) => {
                view.render_article(&details, &body);
                Ok(details)
            }
            Err(e) => {
                warn!(article = ?article_param, error = %e, "article page failed");
                view.render_error();
                Err(e)
            }
        }
    }

    async fn article_page(&self, article_param: Option<&str>) -> Result<(ArticleDetails, String)> {
        let id = ArticleId::parse(article_param.unwrap_or_default())?;

        let body_path = self.paths.body(&id);
        let (details, body) = tokio::join!(
            self.fetch_single(&id),
            self.fetcher.fetch_text(&body_path)
        );
        let details = details?;
        let body = body?;

        info!(article = %id, "article loaded");
        Ok((details, body))
    }
}
