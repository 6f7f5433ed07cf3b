//! Configuration types for article-loader

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// HTTP fetch behaviour shared by every resource request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// How many articles each view shows
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Articles per archive page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Articles in the latest-articles widget (default: 4)
    #[serde(default = "default_latest_count")]
    pub latest_count: usize,

    /// Columns of the latest-articles grid (default: 2)
    ///
    /// Rows are derived from `latest_count / grid_columns`, rounded up.
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            latest_count: default_latest_count(),
            grid_columns: default_grid_columns(),
        }
    }
}

/// Main configuration for article-loader
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Origin every resource path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Path of the index document listing every article id, oldest first
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Directory holding one `{id}/{id}.json` + `{id}/{id}.html` pair per article
    #[serde(default = "default_articles_dir")]
    pub articles_dir: String,

    /// Page that displays a single article, linked from preview cards
    #[serde(default = "default_article_page_path")]
    pub article_page_path: String,

    /// View sizes
    #[serde(default)]
    pub layout: LayoutConfig,

    /// HTTP settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index_path: default_index_path(),
            articles_dir: default_articles_dir(),
            article_page_path: default_article_page_path(),
            layout: LayoutConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Create a config for a site rooted at `base_url`, other settings default
    pub fn for_site(base_url: &str) -> Result<Self> {
        let config = Self {
            base_url: Url::parse(base_url)?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        if self.base_url.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("{} cannot be used as a base URL", self.base_url),
                key: Some("base_url".to_string()),
            });
        }
        let positive = [
            ("layout.page_size", self.layout.page_size),
            ("layout.latest_count", self.layout.latest_count),
            ("layout.grid_columns", self.layout.grid_columns),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(Error::Config {
                    message: format!("{key} must be greater than zero"),
                    key: Some(key.to_string()),
                });
            }
        }
        if self.fetch.timeout.is_zero() {
            return Err(Error::Config {
                message: "fetch.timeout must be greater than zero".to_string(),
                key: Some("fetch.timeout".to_string()),
            });
        }
        Ok(())
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse("http://localhost/").expect("static base URL literal parses")
}

fn default_index_path() -> String {
    "/html/pages/articles.json".to_string()
}

fn default_articles_dir() -> String {
    "/html/pages/articles".to_string()
}

fn default_article_page_path() -> String {
    "/html/pages/article.html".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_latest_count() -> usize {
    4
}

fn default_grid_columns() -> usize {
    2
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("article-loader/", env!("CARGO_PKG_VERSION")).to_string()
}

// Durations travel as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
