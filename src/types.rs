use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// A feed reference as supplied by callers: either a bare URL string or an
/// already-named descriptor. Resolved once at the boundary so the rest of the
/// crate only ever sees the canonical shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedRef {
    Named { name: String, url: String },
    Url(String),
}

impl FeedRef {
    pub fn url(url: impl Into<String>) -> Self {
        FeedRef::Url(url.into())
    }

    pub fn named(name: impl Into<String>, url: impl Into<String>) -> Self {
        FeedRef::Named {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Coerce this reference into a canonical descriptor. A bare URL gets its
    /// hostname (minus a leading `www.`) as the name; if the URL does not
    /// parse, the raw string doubles as both name and url. Never fails.
    pub fn resolve(&self) -> FeedDescriptor {
        match self {
            FeedRef::Named { name, url } => FeedDescriptor {
                name: name.clone(),
                url: url.clone(),
            },
            FeedRef::Url(raw) => match Url::parse(raw) {
                Ok(parsed) => {
                    let host = parsed.host_str().unwrap_or(raw.as_str());
                    let name = host.strip_prefix("www.").unwrap_or(host).to_string();
                    FeedDescriptor {
                        name,
                        url: raw.clone(),
                    }
                }
                Err(_) => FeedDescriptor {
                    name: raw.clone(),
                    url: raw.clone(),
                },
            },
        }
    }
}

/// Canonical feed identity. The `(name, url)` pair keys the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub name: String,
    pub url: String,
}

impl FeedDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Cache key for this feed. The url is part of the key so that distinct
    /// feeds sharing a display name never collide.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.name, self.url)
    }
}

/// One parsed entry from a feed, enriched with derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// `{feed name}-{index within feed}`; unique within one fetch batch as
    /// long as feed names are unique.
    pub id: String,
    pub title: String,
    /// May contain raw HTML from the source.
    pub summary: String,
    pub url: String,
    /// Always populated; a placeholder is assigned at parse time when the
    /// feed item carries no usable image.
    pub image: String,
    /// Feed name this article came from.
    pub source: String,
    /// `None` when the source date was absent or unparsable. Never an
    /// invalid date.
    pub pub_date: Option<DateTime<Utc>>,
    /// Estimated minutes to read, always >= 1.
    pub reading_time: u32,
    /// Engagement surrogate in `[0, 1000)`. See `PopularityScorer`.
    pub popularity: u32,
}

/// Reading-time filter buckets. Disjoint and exhaustive over `[1, inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingTimeBucket {
    #[default]
    All,
    /// <= 5 minutes
    UpTo5,
    /// 6..=10 minutes
    UpTo10,
    /// 11..=20 minutes
    UpTo20,
    /// > 20 minutes
    Over20,
}

impl ReadingTimeBucket {
    pub fn matches(&self, reading_time: u32) -> bool {
        match self {
            ReadingTimeBucket::All => true,
            ReadingTimeBucket::UpTo5 => reading_time <= 5,
            ReadingTimeBucket::UpTo10 => reading_time > 5 && reading_time <= 10,
            ReadingTimeBucket::UpTo20 => reading_time > 10 && reading_time <= 20,
            ReadingTimeBucket::Over20 => reading_time > 20,
        }
    }
}

impl FromStr for ReadingTimeBucket {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" | "" => Ok(ReadingTimeBucket::All),
            "5" => Ok(ReadingTimeBucket::UpTo5),
            "10" => Ok(ReadingTimeBucket::UpTo10),
            "20" => Ok(ReadingTimeBucket::UpTo20),
            "20plus" => Ok(ReadingTimeBucket::Over20),
            other => Err(AggregatorError::InvalidCriteria(format!(
                "unknown reading-time bucket: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    Popularity,
    #[default]
    Date,
    Title,
}

impl FromStr for SortBy {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "popularity" => Ok(SortBy::Popularity),
            "date" => Ok(SortBy::Date),
            "title" => Ok(SortBy::Title),
            other => Err(AggregatorError::InvalidCriteria(format!(
                "unknown sort key: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AggregatorError::InvalidCriteria(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// Transient filter/sort parameters, supplied fresh on each pipeline call.
/// The default mirrors the reader UI: everything shown, newest first.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub search_term: String,
    pub reading_time: ReadingTimeBucket,
    /// Exact-match source filter when a single feed is selected.
    pub source: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Cache coverage over the current feed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    pub total: usize,
    pub cached: usize,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL of the CORS fetch proxy; the feed URL is passed as the
    /// `url` query parameter.
    pub proxy_base: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Hard cap on items taken per feed per cycle.
    pub max_items_per_feed: usize,
    /// Base URL of the optional full-text extraction service.
    pub enrichment_base: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy_base: "https://api.allorigins.win/get".to_string(),
            user_agent: "newsflow/0.1".to_string(),
            timeout_seconds: 10,
            max_items_per_feed: 20,
            enrichment_base: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid filter value: {0}")]
    InvalidCriteria(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_named_descriptor() {
        let feed = FeedRef::named("Le Monde", "https://lemonde.fr/rss");
        let descriptor = feed.resolve();
        assert_eq!(descriptor.name, "Le Monde");
        assert_eq!(descriptor.url, "https://lemonde.fr/rss");
    }

    #[test]
    fn resolve_derives_name_from_hostname() {
        let feed = FeedRef::url("https://www.example.com/feed.xml");
        let descriptor = feed.resolve();
        assert_eq!(descriptor.name, "example.com");
        assert_eq!(descriptor.url, "https://www.example.com/feed.xml");
    }

    #[test]
    fn resolve_falls_back_to_raw_string() {
        let feed = FeedRef::url("not a url");
        let descriptor = feed.resolve();
        assert_eq!(descriptor.name, "not a url");
        assert_eq!(descriptor.url, "not a url");
    }

    #[test]
    fn cache_key_separates_same_name_different_url() {
        let a = FeedDescriptor::new("news", "https://a.example/rss");
        let b = FeedDescriptor::new("news", "https://b.example/rss");
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn bucket_partition_is_exhaustive_and_disjoint() {
        let buckets = [
            ReadingTimeBucket::UpTo5,
            ReadingTimeBucket::UpTo10,
            ReadingTimeBucket::UpTo20,
            ReadingTimeBucket::Over20,
        ];
        for reading_time in 1..=100u32 {
            let matching = buckets.iter().filter(|b| b.matches(reading_time)).count();
            assert_eq!(
                matching, 1,
                "reading time {reading_time} should match exactly one bucket"
            );
        }
    }

    #[test]
    fn criteria_values_parse_from_wire_strings() {
        assert_eq!(
            "20plus".parse::<ReadingTimeBucket>().unwrap(),
            ReadingTimeBucket::Over20
        );
        assert_eq!("all".parse::<ReadingTimeBucket>().unwrap(), ReadingTimeBucket::All);
        assert_eq!("popularity".parse::<SortBy>().unwrap(), SortBy::Popularity);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("7".parse::<ReadingTimeBucket>().is_err());
    }
}
