use clap::Parser;
use newsflow::{
    pipeline, Aggregator, ArticleExtractor, DiskStore, FeedRef, FetchConfig, FilterCriteria,
    KeyValueStore, MemoryStore, ReadingTimeBucket, SortBy, SortOrder,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Fetch, cache, filter, and sort articles from a set of RSS feeds.
#[derive(Parser, Debug)]
#[command(name = "newsflow", version)]
struct Cli {
    /// Feed URLs, or name=url pairs
    #[arg(required = true)]
    feeds: Vec<String>,

    /// Restrict the cycle to one feed by name
    #[arg(long)]
    selected: Option<String>,

    /// Case-insensitive search over title and summary
    #[arg(long, default_value = "")]
    search: String,

    /// Reading-time bucket: all, 5, 10, 20, 20plus
    #[arg(long, default_value = "all")]
    reading_time: String,

    /// Sort key: popularity, date, title
    #[arg(long, default_value = "date")]
    sort_by: String,

    /// Sort order: asc, desc
    #[arg(long, default_value = "desc")]
    sort_order: String,

    /// Drop cached entries before loading
    #[arg(long)]
    refresh: bool,

    /// Fetch proxy base URL
    #[arg(long)]
    proxy: Option<String>,

    /// Base URL of the full-text extraction service; refines reading times
    /// when given
    #[arg(long)]
    enrich: Option<String>,
}

fn parse_feed(spec: &str) -> FeedRef {
    match spec.split_once('=') {
        Some((name, url)) if !name.contains("://") => FeedRef::named(name, url),
        _ => FeedRef::url(spec),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = FetchConfig::default();
    if let Some(proxy) = cli.proxy.clone() {
        config.proxy_base = proxy;
    }
    config.enrichment_base = cli.enrich.clone();

    let criteria = FilterCriteria {
        search_term: cli.search.clone(),
        reading_time: cli.reading_time.parse::<ReadingTimeBucket>()?,
        source: cli.selected.clone(),
        sort_by: cli.sort_by.parse::<SortBy>()?,
        sort_order: cli.sort_order.parse::<SortOrder>()?,
    };

    let store: Arc<dyn KeyValueStore> = match DiskStore::new() {
        Some(disk) => Arc::new(disk),
        None => {
            warn!("No cache directory available, falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let aggregator = Aggregator::from_config(&config, store);
    let feeds: Vec<FeedRef> = cli.feeds.iter().map(|spec| parse_feed(spec)).collect();

    if cli.refresh {
        aggregator.force_refresh(&feeds).await;
    }

    let status = aggregator.cache_status(&feeds).await;
    info!("Cache status: {}/{} feeds cached", status.cached, status.total);

    let articles = aggregator.load(&feeds, cli.selected.as_deref()).await;
    let mut sorted = pipeline::apply(&articles, &criteria);

    if let Some(extractor) = ArticleExtractor::from_config(&config) {
        for article in sorted.iter_mut() {
            extractor.refine_reading_time(article).await;
        }
    }

    for article in &sorted {
        let date = article
            .pub_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "????-??-??".to_string());
        println!(
            "{date}  {:>3} min  [{}]  {}",
            article.reading_time, article.source, article.title
        );
    }
    info!("{} of {} articles after filtering", sorted.len(), articles.len());

    Ok(())
}
