// In-memory title cache with lazy TTL expiry
//
// Entries are checked for age on read and never swept proactively. Concurrent
// misses for the same URL each run their own extraction (no single-flight);
// the last writer wins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    title: String,
    created_at: Instant,
}

/// URL -> title map shared by all requests of one service instance
#[derive(Debug)]
pub struct TitleCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TitleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Title for `url` if present and younger than the TTL. Keys match exactly.
    pub fn get(&self, url: &str) -> Option<String> {
        let entries = self.entries.read();
        entries
            .get(url)
            .filter(|entry| entry.created_at.elapsed() < self.ttl)
            .map(|entry| entry.title.clone())
    }

    /// Insert or overwrite with the current timestamp
    pub fn put(&self, url: &str, title: &str) {
        self.entries.write().insert(
            url.to_string(),
            CacheEntry {
                title: title.to_string(),
                created_at: Instant::now(),
            },
        );
    }

    /// Stored entries, including ones that have expired but not been overwritten
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
