//! Single-resource fetching
//!
//! [`ResourceFetcher`] is the transport seam: one path in, one body or one
//! [`FetchError`] out. Everything above it (JSON parsing, path layout, the
//! fan-out) is transport-agnostic, so tests swap in scripted fetchers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{Config, FetchConfig};
use crate::error::{FetchError, Result};
use crate::types::{ArticleDetails, ArticleId, FetchOutcome};


/// Fetches one resource by path
///
/// Every returned future resolves exactly once, to the body or to a
/// [`FetchError`]. Implementations must not touch the document.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the body at `path` (relative to the site root)
    async fn fetch_text(&self, path: &str) -> std::result::Result<String, FetchError>;
}

/// Production [`ResourceFetcher`] over HTTP
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
    timeout: std::time::Duration,
}

impl HttpFetcher {
    /// Create a fetcher rooted at `base_url`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(base_url: Url, fetch: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch.timeout)
            .user_agent(fetch.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout: fetch.timeout,
        })
    }

    /// Create a fetcher from the site configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.base_url.clone(), &config.fetch)
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> std::result::Result<String, FetchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Transport {
                path: path.to_string(),
                reason: format!("cannot build URL: {}", e),
            })?;

        debug!(url = %url, "fetching resource");

        let response = match tokio::time::timeout(self.timeout, self.client.get(url).send()).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => {
                return Err(FetchError::Timeout {
                    path: path.to_string(),
                    after: self.timeout,
                });
            }
            Ok(Err(e)) => {
                return Err(FetchError::Transport {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    path: path.to_string(),
                    after: self.timeout,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "resource request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            path: path.to_string(),
            reason: format!("failed to read body: {}", e),
        })
    }
}

/// Fetch `path` and parse it as JSON
///
/// A body that does not parse as `T` is a [`FetchError::MalformedPayload`].
pub async fn fetch_json<T>(
    fetcher: &dyn ResourceFetcher,
    path: &str,
) -> std::result::Result<T, FetchError>
where
    T: DeserializeOwned,
{
    let body = fetcher.fetch_text(path).await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(path, error = %e, "malformed payload");
        FetchError::MalformedPayload {
            path: path.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Server-side layout of the article resources
#[derive(Clone, Debug)]
pub struct ResourcePaths {
    index_path: String,
    articles_dir: String,
    article_page_path: String,
}

impl ResourcePaths {
    /// Layout from the site configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            index_path: config.index_path.clone(),
            articles_dir: config.articles_dir.trim_end_matches('/').to_string(),
            article_page_path: config.article_page_path.clone(),
        }
    }

    /// Path of the index document
    pub fn index(&self) -> &str {
        &self.index_path
    }

    /// `{articles_dir}/{id}/{id}.json`
    pub fn metadata(&self, id: &ArticleId) -> String {
        format!("{}/{id}/{id}.json", self.articles_dir)
    }

    /// `{articles_dir}/{id}/{id}.html`
    pub fn body(&self, id: &ArticleId) -> String {
        format!("{}/{id}/{id}.html", self.articles_dir)
    }

    /// Link to the page that displays `id`
    pub fn article_link(&self, id: &ArticleId) -> String {
        format!("{}?article={id}", self.article_page_path)
    }
}

/// Fetch and parse one article's metadata document
pub async fn fetch_article(
    fetcher: &dyn ResourceFetcher,
    paths: &ResourcePaths,
    id: &ArticleId,
) -> FetchOutcome<ArticleDetails> {
    let path = paths.metadata(id);
    fetch_json::<ArticleDetails>(fetcher, &path).await.into()
}
