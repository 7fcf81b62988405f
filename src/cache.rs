//! In-memory cache of rendered feeds
//!
//! Entries expire lazily: lookups ignore entries older than the freshness
//! window, and the next successful scrape overwrites them. Nothing is ever
//! evicted, so the map grows with the number of distinct feeds requested.

use crate::models::SelectorConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default freshness window (10 minutes)
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(600);

/// Cache key for a `(url, config)` pair.
///
/// The pair is JSON-encoded before hashing, so field boundaries cannot
/// collide.
pub fn fingerprint(url: &str, config: &SelectorConfig) -> String {
    let encoded = serde_json::to_vec(&(url.trim(), config)).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub body: String,
    pub created: Instant,
}

impl CacheEntry {
    pub fn is_fresh(&self, freshness: Duration) -> bool {
        self.created.elapsed() < freshness
    }
}

pub struct FeedCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    freshness: Duration,
}

impl FeedCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            freshness,
        }
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.freshness))
            .cloned()
    }

    /// Store `body` under `key`, replacing any previous entry.
    pub fn put(&self, key: String, body: String) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                body,
                created: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let config = SelectorConfig::default();
        assert_eq!(
            fingerprint("https://example.com", &config),
            fingerprint("https://example.com", &config.clone())
        );
        assert_eq!(
            fingerprint(" https://example.com ", &config),
            fingerprint("https://example.com", &config)
        );
        assert_eq!(fingerprint("https://example.com", &config).len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_every_field() {
        let base = SelectorConfig::default();
        let key = fingerprint("https://example.com", &base);

        let variants = vec![
            SelectorConfig { item_selector: ".post".into(), ..base.clone() },
            SelectorConfig { title_selector: "h1".into(), ..base.clone() },
            SelectorConfig { link_selector: "a.more".into(), ..base.clone() },
            SelectorConfig { description_selector: Some("p".into()), ..base.clone() },
            SelectorConfig { image_selector: Some("img".into()), ..base.clone() },
            SelectorConfig { date_selector: Some("time".into()), ..base.clone() },
            SelectorConfig { date_format: "%Y-%m-%d".into(), ..base.clone() },
        ];

        for variant in &variants {
            assert_ne!(fingerprint("https://example.com", variant), key, "{:?}", variant);
        }
        assert_ne!(fingerprint("https://example.org", &base), key);
    }

    #[test]
    fn test_get_returns_fresh_entry() {
        let cache = FeedCache::default();
        assert!(cache.get("k").is_none());

        cache.put("k".to_string(), "<rss/>".to_string());
        assert_eq!(cache.get("k").map(|e| e.body).as_deref(), Some("<rss/>"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_ignored_but_kept() {
        let cache = FeedCache::new(Duration::ZERO);
        cache.put("k".to_string(), "<rss/>".to_string());

        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = FeedCache::default();
        cache.put("k".to_string(), "old".to_string());
        cache.put("k".to_string(), "new".to_string());
        assert_eq!(cache.get("k").unwrap().body, "new");
        assert_eq!(cache.len(), 1);
    }
}
