//! Raw feed retrieval through the CORS fetch proxy.

use crate::types::{FetchConfig, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Seam between the aggregation engine and the network. The aggregator only
/// needs "give me the raw body for this feed URL, or nothing".
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Returns the raw feed body, or `None` when the upstream had no content
    /// for the URL. Transport-level failures surface as errors; the caller
    /// is responsible for isolating them per feed.
    async fn fetch_raw(&self, url: &str) -> Result<Option<String>>;
}

/// Envelope returned by the fetch proxy. A missing or empty `contents` field
/// is the proxy's way of reporting an upstream failure.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    #[serde(default)]
    contents: Option<String>,
}

/// `FeedTransport` implementation backed by a public fetch proxy of the shape
/// `GET {proxy_base}?url={encoded feed URL}`.
pub struct ProxyFetcher {
    client: reqwest::Client,
    proxy_base: String,
}

impl ProxyFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            proxy_base: config.proxy_base.clone(),
        }
    }
}

#[async_trait]
impl FeedTransport for ProxyFetcher {
    async fn fetch_raw(&self, url: &str) -> Result<Option<String>> {
        let request_url = Url::parse_with_params(&self.proxy_base, &[("url", url)])?;
        debug!("Fetching feed through proxy: {}", url);

        let envelope: ProxyEnvelope = self
            .client
            .get(request_url)
            .send()
            .await?
            .json()
            .await?;

        Ok(envelope.contents.filter(|contents| !contents.is_empty()))
    }
}
