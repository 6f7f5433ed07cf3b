//! # article-loader
//!
//! Client-side article loading for a static blog: fetch an index of article
//! identifiers, fan out one request per article, and render the results in
//! the order the index gives them, however the responses arrive.
//!
//! ## Design Philosophy
//!
//! article-loader is designed to be:
//! - **Order-preserving** - Results land at their request position, never in arrival order
//! - **Failure-tolerant** - One missing article becomes a placeholder, not a blank page
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to progress events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use article_loader::{ArchiveView, Config, MemoryDocument, SiteLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let site = SiteLoader::new(Config::for_site("https://blog.example.com/")?)?;
//!
//!     // Subscribe to events
//!     let mut events = site.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let document = Arc::new(MemoryDocument::with_elements([
//!         ArchiveView::ARTICLES,
//!         ArchiveView::PAGINATION,
//!     ]));
//!     let view = ArchiveView::new(document.clone());
//!     site.load_archive_page(Some("1"), &view).await?;
//!
//!     println!("{}", document.content(ArchiveView::ARTICLES).unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Ordered fan-out aggregation
pub mod aggregator;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Resource fetching over HTTP
pub mod fetcher;
/// Page loaders (archive, latest articles, single article)
pub mod loaders;
/// Page rendering
pub mod render;
/// Index paging and selection
pub mod selection;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use aggregator::{AggregationState, FanOutAggregator, IgnoredSettlement, Settlement};
pub use config::{Config, FetchConfig, LayoutConfig};
pub use error::{Error, FetchError, Result, SelectionError};
pub use fetcher::{HttpFetcher, ResourceFetcher, ResourcePaths};
pub use loaders::{LatestArticlesWidget, ScrollPosition, SiteLoader};
pub use render::{
    ArchiveView, ArticleView, Document, LatestGridView, MemoryDocument, Renderer,
};
pub use selection::{ArticleIndex, PageLink};
pub use types::{
    ArticleDate, ArticleDetails, ArticleId, ArticleRecord, ArticleSlot, Event, FetchOutcome,
    Month, ResourceRequest,
};
