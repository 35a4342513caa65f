//! Persisted key-value tier behind the feed cache.
//!
//! Models a browser-localStorage-style store: synchronous string get/set/
//! remove, capacity-bounded, where write failures are an expected condition
//! the caller swallows.

use crate::types::Result;
use directories::ProjectDirs;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Minimal persisted string store. Implementations must tolerate concurrent
/// per-key access; last writer wins.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str);
}

/// In-process store, useful as a default when no disk location is available
/// and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut items) = self.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(key);
        }
    }
}

/// One-file-per-key store under an XDG-compliant cache directory
/// (`~/.cache/newsflow/` on Linux).
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Returns `None` when no cache directory can be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "newsflow")?;
        Some(Self {
            dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Keys contain URLs, so the filename is a sanitized slug plus a hash of
    /// the full key to keep distinct keys from colliding after sanitization.
    fn path_for(&self, key: &str) -> PathBuf {
        let slug: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(48)
            .collect();
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.dir.join(format!("{}-{:016x}.json", slug, hasher.finish()))
    }
}

impl KeyValueStore for DiskStore {
    fn get_item(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        if let Err(e) = fs::remove_file(self.path_for(key)) {
            debug!("Failed to remove cache file for {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("v"));
        store.remove_item("k");
        assert!(store.get_item("k").is_none());
    }

    #[test]
    fn disk_store_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let store = DiskStore::with_dir(dir.path().to_path_buf());

        store
            .set_item("feed-cache-Tech-https://example.com/rss", "{\"a\":1}")
            .unwrap();
        assert_eq!(
            store.get_item("feed-cache-Tech-https://example.com/rss").as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn disk_store_missing_key_is_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = DiskStore::with_dir(dir.path().to_path_buf());
        assert!(store.get_item("absent").is_none());
    }

    #[test]
    fn disk_store_remove_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let store = DiskStore::with_dir(dir.path().to_path_buf());
        store.set_item("k", "v").unwrap();
        store.remove_item("k");
        store.remove_item("k");
        assert!(store.get_item("k").is_none());
    }

    #[test]
    fn similar_keys_use_distinct_files() {
        let dir = TempDir::new().expect("temp dir");
        let store = DiskStore::with_dir(dir.path().to_path_buf());
        // Sanitization maps '/' and ':' to '_'; only the hash separates these.
        store.set_item("news-https://a.example/rss", "a").unwrap();
        store.set_item("news-https:__a.example_rss", "b").unwrap();
        assert_eq!(store.get_item("news-https://a.example/rss").as_deref(), Some("a"));
        assert_eq!(store.get_item("news-https:__a.example_rss").as_deref(), Some("b"));
    }
}
