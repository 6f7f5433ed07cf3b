//! Core types for article-loader

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FetchError, SelectionError};

/// Lowercase words, optional trailing digits, joined by single hyphens
#[allow(clippy::expect_used)]
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(([a-z]+[0-9]*-?)+)$").expect("identifier pattern compiles"));

/// Validated, path-safe article identifier
///
/// Identifiers double as directory and file names on the server
/// (`{articles_dir}/{id}/{id}.json`), so anything outside
/// `^(([a-z]+[0-9]*-?)+)$` is rejected before a request is built.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Validate and wrap an identifier
    pub fn parse(raw: &str) -> Result<Self, SelectionError> {
        if IDENTIFIER_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(SelectionError::InvalidIdentifier(raw.to_string()))
        }
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One article to fetch and the output slot it must land in
///
/// Positions are assigned once by [`ResourceRequest::from_ids`] and never
/// change; each request is moved by value into its own fetch future.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Article to fetch
    pub id: ArticleId,
    /// Zero-based slot in the final ordered output
    pub position: usize,
}

impl ResourceRequest {
    /// Build dense, zero-based requests from an ordered id list
    pub fn from_ids<I>(ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = ArticleId>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(position, id)| Self { id, position })
            .collect()
    }
}

/// Result of exactly one resource fetch
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome<T = ArticleDetails> {
    /// Payload fetched and parsed
    Success(T),
    /// Transport, status or parse failure
    Failure(FetchError),
}

impl<T> FetchOutcome<T> {
    /// Whether this outcome is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failure(_))
    }

    /// Failure reason, if any
    pub fn failure(&self) -> Option<&FetchError> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(e) => Some(e),
        }
    }
}

impl<T> From<Result<T, FetchError>> for FetchOutcome<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(payload) => FetchOutcome::Success(payload),
            Err(e) => FetchOutcome::Failure(e),
        }
    }
}

/// Month as it appears in article metadata: a name (`"March"`) or a number
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Month {
    /// 1-based month number
    Number(u32),
    /// Month name, displayed verbatim
    Name(String),
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Month::Name(name) => f.write_str(name),
            Month::Number(n) => match n.checked_sub(1).and_then(|i| MONTH_NAMES.get(i as usize)) {
                Some(name) => f.write_str(name),
                None => write!(f, "{n}"),
            },
        }
    }
}

/// Publication or modification date
///
/// The canonical shape is `{"year": 2024, "month": "March", "day": 5}`.
/// Older metadata carries a pre-formatted string, which is shown as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleDate {
    /// Structured `{year, month, day}`
    Parts {
        /// Calendar year
        year: i32,
        /// Month name or number
        month: Month,
        /// Day of month
        day: u32,
    },
    /// Legacy pre-formatted date
    Formatted(String),
}

impl std::fmt::Display for ArticleDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleDate::Parts { year, month, day } => write!(f, "{month} {day}, {year}"),
            ArticleDate::Formatted(text) => f.write_str(text),
        }
    }
}

/// Per-article metadata document (`{id}/{id}.json`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArticleDetails {
    /// Article title
    pub title: String,

    /// Short preview shown on listing cards
    #[serde(default)]
    pub preview: String,

    /// Publication date
    pub date: ArticleDate,

    /// Keywords; older documents call these `tags`
    #[serde(default, alias = "tags")]
    pub keywords: Vec<String>,

    /// Last modification date
    #[serde(default, rename = "last-modified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<ArticleDate>,

    /// Position hint embedded by the site generator
    ///
    /// Not used for ordering: the request position is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

/// Rendering input derived from a successfully fetched article
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleRecord {
    /// Article identifier
    pub id: ArticleId,
    /// Article title
    pub title: String,
    /// Preview text, without the trailing ellipsis
    pub preview_text: String,
    /// Publication date
    pub date: ArticleDate,
    /// Link to the article page
    pub url: String,
}

/// One cell of an ordered listing
#[derive(Clone, Debug, PartialEq)]
pub enum ArticleSlot {
    /// Article fetched and parsed
    Article(ArticleRecord),
    /// Stand-in for an article whose fetch failed
    Placeholder {
        /// Article that could not be loaded
        id: ArticleId,
        /// Failure reason
        reason: String,
    },
}

impl ArticleSlot {
    /// Article id behind this slot
    pub fn id(&self) -> &ArticleId {
        match self {
            ArticleSlot::Article(record) => &record.id,
            ArticleSlot::Placeholder { id, .. } => id,
        }
    }

    /// Whether this slot stands in for a failed fetch
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ArticleSlot::Placeholder { .. })
    }
}

/// Progress events emitted while an aggregate runs
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A fetch was dispatched
    FetchStarted {
        /// Article being fetched
        id: ArticleId,
        /// Output slot
        position: usize,
    },

    /// A fetch settled and its slot was written
    FetchSettled {
        /// Article that settled
        id: ArticleId,
        /// Output slot
        position: usize,
        /// Whether the fetch succeeded
        success: bool,
        /// Slots still pending after this one
        remaining: usize,
    },

    /// Every slot settled and at least one succeeded
    AggregateComplete {
        /// Number of slots
        total: usize,
        /// Number of failed slots rendered as placeholders
        failed: usize,
    },

    /// Every slot settled and all of them failed
    AggregateFailed {
        /// Number of slots
        total: usize,
    },
}
