//! TTL and size bounded cache of analysis results
//!
//! ## Expiry
//!
//! Entries older than the TTL are treated as absent on lookup even before
//! they are physically removed. When an insert would exceed the capacity,
//! expired entries are dropped first, then the single oldest entry.
//!
//! ## Thread Safety
//!
//! One `parking_lot::RwLock` guards the map. Lookups share the read lock (hit
//! counters are atomics); inserts, eviction and clearing take the write lock.

use livepatch_core::{AnalysisResult, ContentHash};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// One cached analysis
#[derive(Debug)]
pub struct CacheEntry {
    pub result: AnalysisResult,
    pub inserted_at: Instant,
    pub hit_count: AtomicU64,
}

impl CacheEntry {
    fn new(result: AnalysisResult) -> Self {
        Self {
            result,
            inserted_at: Instant::now(),
            hit_count: AtomicU64::new(0),
        }
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.inserted_at) >= ttl
    }
}

/// Point-in-time view of the cache
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub max_size: usize,
    pub ttl_secs: u64,
}

impl CacheStats {
    /// Hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct AnalysisCache {
    entries: RwLock<HashMap<ContentHash, CacheEntry>>,
    limits: RwLock<(Duration, usize)>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl AnalysisCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            limits: RwLock::new((ttl, max_size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Change TTL and capacity; takes effect on the next lookup or insert
    pub fn set_limits(&self, ttl: Duration, max_size: usize) {
        *self.limits.write() = (ttl, max_size);
    }

    /// Cached result for `key`, or `None` when absent or expired
    pub fn get(&self, key: &ContentHash) -> Option<AnalysisResult> {
        let (ttl, _) = *self.limits.read();
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(ttl, Instant::now()) => {
                entry.hit_count.fetch_add(1, Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.result.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Times `key` has been served since it was inserted
    pub fn hit_count(&self, key: &ContentHash) -> Option<u64> {
        self.entries
            .read()
            .get(key)
            .map(|entry| entry.hit_count.load(Ordering::Relaxed))
    }

    pub fn insert(&self, key: ContentHash, result: AnalysisResult) {
        let (ttl, max_size) = *self.limits.read();
        if max_size == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if !entries.contains_key(&key) && entries.len() >= max_size {
            let evicted = evict(&mut entries, ttl, max_size);
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
        entries.insert(key, CacheEntry::new(result));
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Physically drop expired entries
    pub fn purge_expired(&self) -> usize {
        let (ttl, _) = *self.limits.read();
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let (ttl, max_size) = *self.limits.read();
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            max_size,
            ttl_secs: ttl.as_secs(),
        }
    }
}

/// Make room for one entry: expired entries first, then the single oldest
fn evict(entries: &mut HashMap<ContentHash, CacheEntry>, ttl: Duration, max_size: usize) -> usize {
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(ttl, now));

    while entries.len() >= max_size {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| *key);
        match oldest {
            Some(key) => {
                entries.remove(&key);
            }
            None => break,
        }
    }

    let evicted = before - entries.len();
    trace!(evicted, remaining = entries.len(), "evicted analysis cache entries");
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_core::{Classification, PatternType};
    use std::thread;

    fn result(reason: &str) -> AnalysisResult {
        AnalysisResult::from_classification(
            Classification::new(PatternType::StaticDynamic, reason),
            Duration::from_micros(10),
        )
    }

    fn key(n: u32) -> ContentHash {
        ContentHash::from_content(&n.to_le_bytes())
    }

    #[test]
    fn test_get_after_insert() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 10);
        cache.insert(key(1), result("a"));
        assert_eq!(cache.get(&key(1)).unwrap().reason, "a");
        assert_eq!(cache.hit_count(&key(1)), Some(1));
        assert!(cache.get(&key(2)).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[test]
    fn test_lazy_expiry() {
        let cache = AnalysisCache::new(Duration::ZERO, 10);
        cache.insert(key(1), result("a"));
        // still stored, but never served
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(1)).is_none());
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_single_oldest() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 2);
        cache.insert(key(1), result("first"));
        thread::sleep(Duration::from_millis(2));
        cache.insert(key(2), result("second"));
        thread::sleep(Duration::from_millis(2));
        cache.insert(key(3), result("third"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(2)).is_some());
        assert!(cache.get(&key(3)).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_expired_entries_go_first() {
        let cache = AnalysisCache::new(Duration::from_millis(20), 2);
        cache.insert(key(1), result("old"));
        cache.insert(key(2), result("old"));
        thread::sleep(Duration::from_millis(30));
        cache.set_limits(Duration::from_millis(20), 2);
        cache.insert(key(3), result("fresh"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 1);
        cache.insert(key(1), result("a"));
        cache.insert(key(1), result("b"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)).unwrap().reason, "b");
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 0);
        cache.insert(key(1), result("a"));
        assert!(cache.is_empty());
    }
}
