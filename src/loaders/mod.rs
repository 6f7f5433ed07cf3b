//! Page loaders (decomposed into one submodule per view)
//!
//! [`SiteLoader`] owns the shared pieces: configuration, the resource
//! fetcher, the path layout, the aggregator and the event channel. Each view
//! adds its own entry point:
//! - [`SiteLoader::load_archive_page`] in `archive`
//! - [`LatestArticlesWidget`] in `latest`
//! - [`SiteLoader::load_article`] in `article`

mod archive;
mod article;
mod latest;


use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::aggregator::FanOutAggregator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{HttpFetcher, ResourceFetcher, ResourcePaths, fetch_article, fetch_json};
use crate::selection::ArticleIndex;
use crate::types::{
    ArticleDetails, ArticleId, ArticleRecord, ArticleSlot, Event, FetchOutcome, ResourceRequest,
};

pub use latest::{LatestArticlesWidget, ScrollPosition};

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared entry point for every page view
#[derive(Clone)]
pub struct SiteLoader {
    config: Arc<Config>,
    fetcher: Arc<dyn ResourceFetcher>,
    paths: ResourcePaths,
    aggregator: FanOutAggregator,
    event_tx: broadcast::Sender<Event>,
}

impl SiteLoader {
    /// Loader fetching over HTTP from `config.base_url`
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be created
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::from_config(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Loader using a caller-supplied fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ResourceFetcher>) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            paths: ResourcePaths::from_config(&config),
            config: Arc::new(config),
            fetcher,
            aggregator: FanOutAggregator::with_events(event_tx.clone()),
            event_tx,
        })
    }

    /// Subscribe to aggregate progress events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resource path layout
    pub fn paths(&self) -> &ResourcePaths {
        &self.paths
    }

    /// Fetch the index of every article id, oldest first
    pub async fn fetch_index(&self) -> Result<ArticleIndex> {
        let index: ArticleIndex = fetch_json(self.fetcher.as_ref(), self.paths.index()).await?;
        debug!(articles = index.len(), "fetched article index");
        Ok(index)
    }

    /// Fetch `ids` concurrently and return one slot per id, in the given order
    ///
    /// Failed fetches become placeholders unless every fetch failed, which is
    /// [`Error::AllFetchesFailed`].
    pub async fn load_slots(&self, ids: Vec<ArticleId>) -> Result<Vec<ArticleSlot>> {
        let requests = ResourceRequest::from_ids(ids.iter().cloned());
        let fetcher = self.fetcher.as_ref();
        let paths = &self.paths;

        let outcomes = self
            .aggregator
            .aggregate(requests, move |request| async move {
                fetch_article(fetcher, paths, &request.id).await
            })
            .await?;

        Ok(ids
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .map(|(position, (id, outcome))| match outcome {
                FetchOutcome::Success(details) => {
                    // List position decides placement; the embedded index is informational
                    if let Some(index) = details.index
                        && usize::try_from(index).ok() != Some(position)
                    {
                        debug!(article = %id, position, index, "payload index disagrees with position");
                    }
                    ArticleSlot::Article(self.record(id, details))
                }
                FetchOutcome::Failure(e) => ArticleSlot::Placeholder {
                    id,
                    reason: e.to_string(),
                },
            })
            .collect())
    }

    /// Fetch one article's metadata through the aggregator
    async fn fetch_single(&self, id: &ArticleId) -> Result<ArticleDetails> {
        let fetcher = self.fetcher.as_ref();
        let paths = &self.paths;
        let outcomes = self
            .aggregator
            .aggregate(
                ResourceRequest::from_ids([id.clone()]),
                move |request| async move { fetch_article(fetcher, paths, &request.id).await },
            )
            .await?;

        match outcomes.into_iter().next() {
            Some(FetchOutcome::Success(details)) => Ok(details),
            Some(FetchOutcome::Failure(e)) => Err(Error::Fetch(e)),
            None => Err(Error::Other(format!("no outcome for article {id}"))),
        }
    }

    fn record(&self, id: ArticleId, details: ArticleDetails) -> ArticleRecord {
        ArticleRecord {
            url: self.paths.article_link(&id),
            id,
            title: details.title,
            preview_text: details.preview,
            date: details.date,
        }
    }
}

impl std::fmt::Debug for SiteLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteLoader")
            .field("base_url", &self.config.base_url.as_str())
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
