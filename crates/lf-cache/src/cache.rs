//! Bounded LRU cache of materialized datasets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lf_core::JobId;

use crate::dataset::Dataset;

/// Hit/miss/eviction counters, observable by callers and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CacheEntry {
    dataset: Arc<Dataset>,
    /// Monotonic tick of the last get/put touching this entry
    last_access: u64,
    /// Tick at insertion, breaks recency ties in favor of the older entry
    inserted: u64,
}

struct CacheInner {
    limit: usize,
    tick: u64,
    entries: HashMap<JobId, CacheEntry>,
    stats: CacheStats,
}

/// Strict-LRU cache mapping a job id to its materialized dataset.
///
/// `get` and `put` both mark the entry most recently used; eviction removes
/// the entry with the oldest access (ties by oldest insertion). A limit of
/// zero caches nothing.
pub struct ResultCache {
    inner: Mutex<CacheInner>,
}

impl ResultCache {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                limit,
                tick: 0,
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn get(&self, job_id: &str) -> Option<Arc<Dataset>> {
        let mut guard = self.inner.lock().expect("cache lock poisoned");
        let inner = &mut *guard;
        inner.tick += 1;
        match inner.entries.get_mut(job_id) {
            Some(entry) => {
                entry.last_access = inner.tick;
                inner.stats.hits += 1;
                Some(Arc::clone(&entry.dataset))
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, job_id: &str, dataset: Arc<Dataset>) {
        let mut guard = self.inner.lock().expect("cache lock poisoned");
        let inner = &mut *guard;
        if inner.limit == 0 {
            return;
        }

        inner.tick += 1;
        let tick = inner.tick;
        match inner.entries.get_mut(job_id) {
            Some(entry) => {
                entry.dataset = dataset;
                entry.last_access = tick;
            }
            None => {
                inner.entries.insert(
                    job_id.to_string(),
                    CacheEntry {
                        dataset,
                        last_access: tick,
                        inserted: tick,
                    },
                );
            }
        }

        while inner.entries.len() > inner.limit {
            let victim = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.last_access, e.inserted))
                .map(|(id, _)| id.clone());
            match victim {
                Some(id) => {
                    inner.entries.remove(&id);
                    inner.stats.evictions += 1;
                }
                None => break,
            }
        }
    }

    /// Remove one entry; absent is a no-op.
    pub fn invalidate(&self, job_id: &str) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.remove(job_id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.inner
            .lock()
            .expect("cache lock poisoned")
            .entries
            .contains_key(job_id)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().expect("cache lock poisoned").stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(job_id: &str) -> Arc<Dataset> {
        Arc::new(Dataset {
            job_id: job_id.to_string(),
            times_s: vec![0.0],
            positions_m: vec![0.0],
            fields: Vec::new(),
            derived: Default::default(),
        })
    }

    #[test]
    fn get_miss_then_hit() {
        let cache = ResultCache::new(2);
        assert!(cache.get("a").is_none());
        cache.put("a", dataset("a"));
        assert!(cache.get("a").is_some());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResultCache::new(2);
        cache.put("a", dataset("a"));
        cache.put("b", dataset("b"));
        cache.put("c", dataset("c")); // evicts a

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));

        // Touch b, then insert d: c is now the least recently used.
        assert!(cache.get("b").is_some());
        cache.put("d", dataset("d"));
        assert!(!cache.contains("c"));
        assert!(cache.contains("b"));
        assert!(cache.contains("d"));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn access_then_insert_keeps_touched_entry() {
        // Fill, touch the oldest entry, insert one more: the untouched
        // middle entry is the victim.
        let cache = ResultCache::new(3);
        cache.put("a", dataset("a"));
        cache.put("b", dataset("b"));
        cache.put("c", dataset("c"));
        assert!(cache.get("a").is_some());
        cache.put("d", dataset("d")); // evicts b

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn put_replaces_and_refreshes_existing_entry() {
        let cache = ResultCache::new(2);
        cache.put("a", dataset("a"));
        cache.put("b", dataset("b"));
        cache.put("a", dataset("a")); // refresh a
        cache.put("c", dataset("c")); // evicts b

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn invalidate_is_idempotent() {
        let cache = ResultCache::new(2);
        cache.put("a", dataset("a"));
        cache.invalidate("a");
        cache.invalidate("a");
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_limit_caches_nothing() {
        let cache = ResultCache::new(0);
        cache.put("a", dataset("a"));
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
