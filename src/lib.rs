pub mod aggregator;
pub mod cache;
pub mod enrich;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod types;

pub use aggregator::Aggregator;
pub use cache::{CacheEntry, FeedCache, CACHE_TTL_MS};
pub use enrich::ArticleExtractor;
pub use fetcher::{FeedTransport, ProxyFetcher};
pub use parser::{FeedParser, FixedScorer, PopularityScorer, RandomScorer};
pub use store::{DiskStore, KeyValueStore, MemoryStore};
pub use types::*;
