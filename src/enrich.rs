//! Best-effort full-text enrichment.
//!
//! Talks to the external extraction microservice
//! (`GET {base}/extract?url={encoded article URL}` returning readable text)
//! to refine the reading-time estimate beyond title+summary. The service is
//! optional: any failure falls back to the estimate already on the article
//! without surfacing an error.

use crate::parser::estimate_reading_time;
use crate::types::{Article, FetchConfig};
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct ExtractedArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

pub struct ArticleExtractor {
    client: reqwest::Client,
    base: String,
}

impl ArticleExtractor {
    /// Returns `None` when the config carries no enrichment endpoint.
    pub fn from_config(config: &FetchConfig) -> Option<Self> {
        let base = config.enrichment_base.clone()?;
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");
        Some(Self { client, base })
    }

    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into(),
        }
    }

    /// Fetches readable article text for a URL. `None` on any failure.
    pub async fn extract(&self, article_url: &str) -> Option<ExtractedArticle> {
        let endpoint = format!("{}/extract", self.base.trim_end_matches('/'));
        let request_url = match Url::parse_with_params(&endpoint, &[("url", article_url)]) {
            Ok(url) => url,
            Err(e) => {
                debug!("Bad enrichment endpoint {}: {}", endpoint, e);
                return None;
            }
        };

        match self.client.get(request_url).send().await {
            Ok(response) => match response.json::<ExtractedArticle>().await {
                Ok(extracted) => Some(extracted),
                Err(e) => {
                    debug!("Enrichment response unreadable for {}: {}", article_url, e);
                    None
                }
            },
            Err(e) => {
                debug!("Enrichment call failed for {}: {}", article_url, e);
                None
            }
        }
    }

    /// Recomputes the article's reading time from extracted full text when
    /// available; leaves the title+summary estimate untouched otherwise.
    pub async fn refine_reading_time(&self, article: &mut Article) {
        if let Some(extracted) = self.extract(&article.url).await {
            if let Some(content) = extracted.content {
                if !content.trim().is_empty() {
                    article.reading_time = estimate_reading_time(&content);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracted_article_tolerates_partial_payloads() {
        let extracted: ExtractedArticle = serde_json::from_str("{}").unwrap();
        assert!(extracted.title.is_none());
        assert!(extracted.content.is_none());

        let extracted: ExtractedArticle =
            serde_json::from_str(r#"{"title":"t","content":"body text"}"#).unwrap();
        assert_eq!(extracted.content.as_deref(), Some("body text"));
    }
}
