//! TTL cache for AI results.
//!
//! Expiry is computed against an injected [`Clock`] and entries live in an
//! injected [`CacheStore`], so tests can advance time without sleeping and
//! swap the backend. The default backend is a bounded in-process LRU: entries
//! are lost on restart and not shared between instances.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use tracing::debug;

/// Entry bound for [`TtlCache::in_memory`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: DateTime<Utc>,
}

/// Storage backend for cache entries.
pub trait CacheStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry<V>>;
    fn put(&self, key: String, entry: CacheEntry<V>);
    fn remove(&self, key: &str);
    /// Drops every entry inserted at or before `cutoff`; returns how many.
    fn remove_older_than(&self, cutoff: DateTime<Utc>) -> usize;
    fn len(&self) -> usize;
}

/// In-memory LRU backend. Once full, the least recently used entry makes room.
/// A poisoned lock is recovered rather than propagated: the map holds plain
/// values with no cross-entry invariants.
pub struct MemoryStore<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
}

impl<V> MemoryStore<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V: Clone + Send + Sync> CacheStore<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn put(&self, key: String, entry: CacheEntry<V>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(key, entry);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.pop(key);
    }

    fn remove_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.inserted_at <= cutoff)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        stale.len()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[derive(Clone)]
pub struct TtlCache<V> {
    store: Arc<dyn CacheStore<V>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Memory-backed cache on the system clock.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryStore::default()), Arc::new(SystemClock), ttl)
    }

    pub fn new(store: Arc<dyn CacheStore<V>>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Returns the live value for `key`. Expired entries are evicted on read.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.store.get(key)?;
        if self.clock.now() - entry.inserted_at >= self.ttl {
            debug!("Cache entry '{key}' expired");
            self.store.remove(key);
            return None;
        }
        Some(entry.value)
    }

    /// Stores `value` under `key`, first sweeping every expired entry so
    /// keys that are never read again do not accumulate.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let now = self.clock.now();
        let swept = self.store.remove_older_than(now - self.ttl);
        if swept > 0 {
            debug!("Swept {swept} expired cache entries");
        }
        self.store.put(
            key.into(),
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.store.remove(key);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }
}
