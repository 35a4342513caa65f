//! Two-tier cache of parsed articles, keyed by feed identity.
//!
//! The in-process tier avoids re-deserializing on every read; the persisted
//! tier survives restarts. A hit in the persisted tier is promoted into the
//! in-process map. Writes go through to both tiers, and a persisted-tier
//! write failure degrades to memory-only caching for that cycle.

use crate::store::KeyValueStore;
use crate::types::Article;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Validity window for a cached feed.
pub const CACHE_TTL_MS: i64 = 15 * 60 * 1000;

const STORE_PREFIX: &str = "feed-cache-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
    pub items: Vec<Article>,
}

pub struct FeedCache {
    memory: RwLock<HashMap<String, CacheEntry>>,
    store: Arc<dyn KeyValueStore>,
    ttl_ms: i64,
}

impl FeedCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, CACHE_TTL_MS)
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl_ms: i64) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            store,
            ttl_ms,
        }
    }

    /// Looks up an entry, checking the in-process tier first. A persisted-tier
    /// hit populates the in-process tier as a side effect of the read.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.memory.read().await.get(key) {
            return Some(entry.clone());
        }

        let stored = self.store.get_item(&format!("{STORE_PREFIX}{key}"))?;
        match serde_json::from_str::<CacheEntry>(&stored) {
            Ok(entry) => {
                self.memory.write().await.insert(key.to_string(), entry.clone());
                Some(entry)
            }
            Err(e) => {
                debug!("Discarding unreadable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    pub fn is_valid(&self, entry: &CacheEntry) -> bool {
        Utc::now().timestamp_millis() - entry.timestamp < self.ttl_ms
    }

    /// `get` restricted to unexpired entries.
    pub async fn get_valid(&self, key: &str) -> Option<Vec<Article>> {
        let entry = self.get(key).await?;
        if self.is_valid(&entry) {
            Some(entry.items)
        } else {
            None
        }
    }

    /// Writes through to both tiers. Persisted-tier failures are swallowed;
    /// caching is best-effort, never a hard dependency.
    pub async fn put(&self, key: &str, items: Vec<Article>) {
        let entry = CacheEntry {
            timestamp: Utc::now().timestamp_millis(),
            items,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = self.store.set_item(&format!("{STORE_PREFIX}{key}"), &json) {
                    warn!("Persisted cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to serialize cache entry for {}: {}", key, e),
        }

        self.memory.write().await.insert(key.to_string(), entry);
    }

    /// Removes an entry from both tiers.
    pub async fn invalidate(&self, key: &str) {
        self.memory.write().await.remove(key);
        self.store.remove_item(&format!("{STORE_PREFIX}{key}"));
    }

    pub async fn invalidate_all<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.invalidate(key.as_ref()).await;
        }
    }
}
