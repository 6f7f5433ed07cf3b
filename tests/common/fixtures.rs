//! Mock blog server and article documents

use std::sync::Arc;
use std::time::Duration;

use article_loader::{
    ArchiveView, ArticleView, Config, LatestGridView, MemoryDocument, SiteLoader,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Index document path under the default layout
pub const INDEX_PATH: &str = "/html/pages/articles.json";

/// Metadata document path for `id`
pub fn metadata_path(id: &str) -> String {
    format!("/html/pages/articles/{id}/{id}.json")
}

/// Body fragment path for `id`
pub fn body_path(id: &str) -> String {
    format!("/html/pages/articles/{id}/{id}.html")
}

/// Metadata document the site build produces for an article
pub fn article_metadata(id: &str, position: usize) -> Value {
    json!({
        "title": format!("Article {id}"),
        "preview": format!("The story of {id}"),
        "date": {"year": 2023, "month": "March", "day": position + 1},
        "keywords": ["notes", id],
        "last-modified": {"year": 2024, "month": "January", "day": 5},
        "index": position,
    })
}

/// `post0`, `post1`, ... oldest first
pub fn numbered_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("post{i}")).collect()
}

/// Blog served by a wiremock server
pub struct MockSite {
    pub server: MockServer,
}

impl MockSite {
    /// Server with nothing mounted
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Server publishing `ids` with a metadata document and body for each
    pub async fn with_articles(ids: &[String]) -> Self {
        let site = Self::start().await;
        site.mount_index(ids).await;
        for (position, id) in ids.iter().enumerate() {
            site.mount_article(id, position, Duration::ZERO).await;
            site.mount_body(id, &format!("<p>Body of {id}</p>")).await;
        }
        site
    }

    pub async fn mount_index(&self, ids: &[String]) {
        Mock::given(method("GET"))
            .and(path(INDEX_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(ids))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_article(&self, id: &str, position: usize, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(metadata_path(id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(article_metadata(id, position))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_body(&self, id: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(body_path(id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.server)
            .await;
    }

    /// Make `request_path` answer with `status`, ahead of earlier mounts
    pub async fn mount_status(&self, request_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Loader pointed at this server with default layout
    pub fn loader(&self) -> SiteLoader {
        let config = Config::for_site(&self.server.uri()).expect("mock server URI is a base URL");
        SiteLoader::new(config).expect("loader for mock server")
    }

    /// Number of requests the server has received for `request_path`
    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

pub fn archive_document() -> Arc<MemoryDocument> {
    Arc::new(MemoryDocument::with_elements([
        ArchiveView::ARTICLES,
        ArchiveView::PAGINATION,
    ]))
}

pub fn grid_document() -> Arc<MemoryDocument> {
    let mut selectors = LatestGridView::cell_selectors(4, 2);
    selectors.push(LatestGridView::CONTAINER.to_string());
    Arc::new(MemoryDocument::with_elements(selectors))
}

pub fn article_document() -> Arc<MemoryDocument> {
    Arc::new(MemoryDocument::with_elements([
        ArticleView::TITLE,
        ArticleView::DATE,
        ArticleView::KEYWORDS,
        ArticleView::LAST_MODIFIED,
        ArticleView::CONTENT,
        ArticleView::MAIN,
    ]))
}
