//! Error types for article-loader
//!
//! Three layers of failure are distinguished:
//! - [`FetchError`] - one resource could not be fetched or parsed. These never
//!   escape an aggregate on their own; they become failure slots.
//! - [`SelectionError`] - caller input (page parameter, identifier) was
//!   rejected before any network call was issued.
//! - [`Error`] - the crate-wide error returned from loaders and constructors.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for article-loader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for article-loader
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "layout.page_size")
        key: Option<String>,
    },

    /// Caller input was rejected before any fetch was dispatched
    #[error("invalid selection: {0}")]
    Selection(#[from] SelectionError),

    /// A single required resource failed (index document, single article)
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Every fetch of an aggregate failed
    #[error("all {count} article fetches failed (first error: {first_error})")]
    AllFetchesFailed {
        /// Number of requests in the aggregate
        count: usize,
        /// Reason reported by the lowest-positioned failure
        first_error: String,
    },

    /// Network error while building or using the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A resource URL could not be built
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failure of one resource fetch
///
/// The `Display` output is the failure reason recorded in the slot.
/// `MalformedPayload` prints only `malformed payload`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP {status} for {path}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Resource path that was requested
        path: String,
    },

    /// The request never produced a response
    #[error("transport error for {path}: {reason}")]
    Transport {
        /// Resource path that was requested
        path: String,
        /// Underlying transport error message
        reason: String,
    },

    /// The request exceeded the configured timeout
    #[error("timed out after {after:?} fetching {path}")]
    Timeout {
        /// Resource path that was requested
        path: String,
        /// Configured timeout
        after: Duration,
    },

    /// The body arrived but could not be parsed as the expected document
    #[error("malformed payload")]
    MalformedPayload {
        /// Resource path that was requested
        path: String,
        /// Parser error, kept for logging
        reason: String,
    },
}

impl FetchError {
    /// Path of the resource this failure belongs to
    pub fn path(&self) -> &str {
        match self {
            FetchError::Status { path, .. }
            | FetchError::Transport { path, .. }
            | FetchError::Timeout { path, .. }
            | FetchError::MalformedPayload { path, .. } => path,
        }
    }

    /// Whether the failure happened below the HTTP status line
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Transport { .. } | FetchError::Timeout { .. }
        )
    }
}

/// Rejected caller input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Page parameter missing, non-numeric, or zero
    #[error("invalid page parameter {0:?}")]
    InvalidPageParameter(String),

    /// Page number beyond the last page of a non-empty index
    #[error("page {page} is out of range (index has {pages} pages)")]
    PageOutOfRange {
        /// Requested 1-based page
        page: usize,
        /// Number of pages available
        pages: usize,
    },

    /// Resource identifier failed pattern validation
    #[error("invalid article identifier {0:?}")]
    InvalidIdentifier(String),
}
