//! Feed XML to article records, with derived reading time, image, and
//! popularity.

use crate::types::{Article, FeedDescriptor};
use chrono::Utc;
use feed_rs::model::Entry;
use feed_rs::parser;
use rand::Rng;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};

/// Words-per-minute model behind the reading-time estimate.
const WORDS_PER_MINUTE: f64 = 200.0;

/// Themed placeholders keyed by feed-name heuristics, with a generic default.
const PLACEHOLDER_GAMING: &str =
    "https://images.unsplash.com/photo-1542751371-adc38448a05e?w=400&h=200&fit=crop";
const PLACEHOLDER_TECH: &str =
    "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&h=200&fit=crop";
const PLACEHOLDER_AI: &str =
    "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=400&h=200&fit=crop";
const PLACEHOLDER_SECURITY: &str =
    "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?w=400&h=200&fit=crop";
const PLACEHOLDER_DEFAULT: &str =
    "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=400&h=200&fit=crop";

/// Pluggable engagement signal. The production reader has no measured
/// engagement data, so the default scorer is a random surrogate; swap in a
/// real implementation when one exists.
pub trait PopularityScorer: Send + Sync {
    fn score(&self) -> u32;
}

/// Placeholder metric: uniform in `[0, 1000)`.
pub struct RandomScorer;

impl PopularityScorer for RandomScorer {
    fn score(&self) -> u32 {
        rand::thread_rng().gen_range(0..1000)
    }
}

/// Deterministic scorer for tests and reproducible runs.
pub struct FixedScorer(pub u32);

impl PopularityScorer for FixedScorer {
    fn score(&self) -> u32 {
        self.0
    }
}

#[derive(Clone)]
pub struct FeedParser {
    max_items: usize,
    scorer: Arc<dyn PopularityScorer>,
}

impl FeedParser {
    pub fn new(max_items: usize) -> Self {
        Self::with_scorer(max_items, Arc::new(RandomScorer))
    }

    pub fn with_scorer(max_items: usize, scorer: Arc<dyn PopularityScorer>) -> Self {
        Self { max_items, scorer }
    }

    /// Parses raw feed XML into articles for one feed. A malformed feed
    /// yields an empty list; a malformed item is dropped without aborting
    /// the rest of the feed.
    pub fn parse(&self, raw_xml: &str, feed: &FeedDescriptor) -> Vec<Article> {
        let parsed = match parser::parse(raw_xml.as_bytes()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse feed {}: {}", feed.name, e);
                return Vec::new();
            }
        };

        let articles: Vec<Article> = parsed
            .entries
            .into_iter()
            .take(self.max_items)
            .enumerate()
            .filter_map(|(index, entry)| self.parse_entry(entry, index, feed))
            .collect();

        debug!("Parsed {} articles from feed {}", articles.len(), feed.name);
        articles
    }

    fn parse_entry(&self, entry: Entry, index: usize, feed: &FeedDescriptor) -> Option<Article> {
        let title = entry.title.as_ref().map(|t| t.content.clone()).unwrap_or_default();
        let summary = entry.summary.as_ref().map(|s| s.content.clone()).unwrap_or_default();
        let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();

        // An entry with no text and no link carries nothing renderable.
        if title.is_empty() && summary.is_empty() && link.is_empty() {
            debug!("Dropping empty item {} from feed {}", index, feed.name);
            return None;
        }

        let pub_date = entry.published.map(|d| d.with_timezone(&Utc));
        let image = extract_image(&entry, &summary)
            .unwrap_or_else(|| placeholder_image(&feed.name).to_string());
        let reading_time = estimate_reading_time(&format!("{title} {summary}"));

        Some(Article {
            id: format!("{}-{}", feed.name, index),
            title,
            summary,
            url: link,
            image,
            source: feed.name.clone(),
            pub_date,
            reading_time,
            popularity: self.scorer.score(),
        })
    }
}

/// Fixed 200-wpm estimate over whatever text is available, floored at one
/// minute so every article lands in a reading-time bucket.
pub fn estimate_reading_time(text: &str) -> u32 {
    let word_count = text.split_whitespace().count();
    ((word_count as f64 / WORDS_PER_MINUTE).round() as u32).max(1)
}

/// Image preference order: image-typed media/enclosure content, then the
/// first `<img src>` inside the summary HTML.
fn extract_image(entry: &Entry, summary: &str) -> Option<String> {
    for media in &entry.media {
        for content in &media.content {
            let Some(url) = content.url.as_ref() else {
                continue;
            };
            let is_image = content
                .content_type
                .as_ref()
                .map(|m| m.to_string().starts_with("image/"))
                .unwrap_or(false);
            if is_image {
                return Some(url.to_string());
            }
        }
    }

    // Enclosures surface either as an out-of-line content link or as a
    // rel="enclosure" entry link, depending on the feed dialect.
    if let Some(src) = entry.content.as_ref().and_then(|c| c.src.as_ref()) {
        let is_image = src
            .media_type
            .as_deref()
            .map(|m| m.starts_with("image/"))
            .unwrap_or(false);
        if is_image && !src.href.is_empty() {
            return Some(src.href.clone());
        }
    }

    for link in &entry.links {
        let is_enclosure = link.rel.as_deref() == Some("enclosure");
        let is_image = link
            .media_type
            .as_deref()
            .map(|m| m.starts_with("image/"))
            .unwrap_or(false);
        if is_enclosure && is_image && !link.href.is_empty() {
            return Some(link.href.clone());
        }
    }

    first_img_src(summary)
}

fn first_img_src(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse("img").expect("static selector");
    fragment
        .select(&selector)
        .find_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(|src| src.to_string())
}

/// Category heuristics over the feed name, French and English spellings.
fn placeholder_image(feed_name: &str) -> &'static str {
    let name = feed_name.to_lowercase();
    if name.contains("gaming") || name.contains("jeu") {
        PLACEHOLDER_GAMING
    } else if name.contains("tech") || name.contains("technologie") {
        PLACEHOLDER_TECH
    } else if name.contains("ia") || name.contains("intelligence") {
        PLACEHOLDER_AI
    } else if name.contains("sécurité") || name.contains("security") {
        PLACEHOLDER_SECURITY
    } else {
        PLACEHOLDER_DEFAULT
    }
}
