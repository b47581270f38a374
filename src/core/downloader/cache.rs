use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

struct CacheEntry {
    bytes: Vec<u8>,
    fetched_at: DateTime<Utc>,
}

/// URL-keyed payload cache with a fixed time-to-live.
///
/// Re-running a build after a failure must not refetch assets that already
/// arrived; expired entries are evicted on every access and insert.
pub struct AssetCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl AssetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn get(&mut self, url: &str) -> Option<Vec<u8>> {
        self.evict_expired();
        self.entries.get(url).map(|entry| entry.bytes.clone())
    }

    pub fn insert(&mut self, url: &str, bytes: Vec<u8>) {
        self.evict_expired();
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                bytes,
                fetched_at: Utc::now(),
            },
        );
    }

    pub fn evict_expired(&mut self) {
        let deadline = Utc::now() - self.ttl;
        self.entries.retain(|_, entry| entry.fetched_at > deadline);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
