//! Thread-Safe Storage Engine
//!
//! This module implements the shared key-value map that every client
//! connection reads from and writes to.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Keys are spread over a fixed set of shards, each behind its own lock.
//! 2. **RwLock**: Readers of a shard proceed together; a writer holds the shard exclusively.
//! 3. **Total Operations**: `set` and `get` never fail. A poisoned lock is recovered
//!    rather than propagated.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key always hashes to the same shard, so a `set` excludes every other
//! `set` and `get` on that key for its duration.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Number of shards for the storage engine.
const NUM_SHARDS: usize = 64;

/// A single shard containing a portion of the key-value pairs.
#[derive(Debug, Default)]
struct Shard {
    data: RwLock<HashMap<String, String>>,
}

impl Shard {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Point-in-time counters describing the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of distinct keys stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// GETs that found a value
    pub hits: u64,
    /// GETs for keys that were never set
    pub misses: u64,
}

/// The shared key-value store.
///
/// One instance is created at startup, wrapped in an `Arc`, and handed to
/// every connection. All operations take `&self`.
///
/// # Example
///
/// ```
/// use redis_lite::storage::StorageEngine;
///
/// let engine = StorageEngine::new();
///
/// engine.set("name", "redis-lite");
/// assert_eq!(engine.get("name"), Some("redis-lite".to_string()));
/// assert_eq!(engine.get("missing"), None);
/// ```
pub struct StorageEngine {
    shards: Vec<Shard>,
    key_count: AtomicU64,
    get_count: AtomicU64,
    set_count: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty storage engine.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            key_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    /// Returns the number of shards keys are spread across.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    #[inline]
    fn get_shard(&self, key: &str) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Inserts or overwrites the value stored under `key`.
    ///
    /// Returns `true` if the key was new, `false` if an existing value was replaced.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let key = key.into();
        let value = value.into();
        let mut data = self.get_shard(&key).write();

        let is_new = data.insert(key, value).is_none();
        if is_new {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }

        is_new
    }

    /// Returns the current value for `key`, or `None` if it was never set.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let value = self.get_shard(key).read().get(key).cloned();

        match value {
            Some(_) => self.hit_count.fetch_add(1, Ordering::Relaxed),
            None => self.miss_count.fetch_add(1, Ordering::Relaxed),
        };

        value
    }

    /// Returns the number of keys in the store.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    /// Returns true if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the engine counters.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.key_count.load(Ordering::Relaxed),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_and_get() {
        let engine = StorageEngine::new();

        assert!(engine.set("key", "value"));
        assert_eq!(engine.get("key"), Some("value".to_string()));
    }

    #[test]
    fn test_get_nonexistent() {
        let engine = StorageEngine::new();
        assert_eq!(engine.get("nonexistent"), None);
    }

    #[test]
    fn test_overwrite() {
        let engine = StorageEngine::new();

        assert!(engine.set("key", "first"));
        assert!(!engine.set("key", "second"));
        assert_eq!(engine.get("key"), Some("second".to_string()));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_repeated_identical_set() {
        let engine = StorageEngine::new();

        for _ in 0..5 {
            engine.set("key", "same value");
        }

        assert_eq!(engine.get("key"), Some("same value".to_string()));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_value_with_spaces() {
        let engine = StorageEngine::new();

        engine.set("greeting", "hello big world");
        assert_eq!(engine.get("greeting"), Some("hello big world".to_string()));
    }

    #[test]
    fn test_stats() {
        let engine = StorageEngine::new();
        assert!(engine.is_empty());

        engine.set("a", "1");
        engine.set("b", "2");
        engine.get("a");
        engine.get("zzz");

        let stats = engine.stats();
        assert_eq!(stats.keys, 2);
        assert_eq!(stats.set_ops, 2);
        assert_eq!(stats.get_ops, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_same_key_same_shard() {
        let engine = StorageEngine::new();
        assert_eq!(engine.shard_index("foo"), engine.shard_index("foo"));
        assert!(engine.shard_index("foo") < engine.shard_count());
    }

    #[test]
    fn test_concurrent_access() {
        let engine = Arc::new(StorageEngine::new());
        let mut handles = vec![];

        for i in 0..10 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key-{}-{}", i, j);
                    engine.set(key.clone(), "value");
                    assert_eq!(engine.get(&key), Some("value".to_string()));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.len(), 1000);
    }

    #[test]
    fn test_concurrent_writers_last_writer_wins() {
        let engine = Arc::new(StorageEngine::new());
        let v1 = "a".repeat(4096);
        let v2 = "b".repeat(4096);

        let handles: Vec<_> = [v1.clone(), v2.clone()]
            .into_iter()
            .map(|value| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for _ in 0..500 {
                        engine.set("contended", value.clone());
                    }
                })
            })
            .collect();

        let reader = {
            let engine = Arc::clone(&engine);
            let (v1, v2) = (v1.clone(), v2.clone());
            thread::spawn(move || {
                for _ in 0..500 {
                    if let Some(seen) = engine.get("contended") {
                        assert!(seen == v1 || seen == v2, "observed a torn value");
                    }
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        let last = engine.get("contended").unwrap();
        assert!(last == v1 || last == v2);
    }

    #[test]
    fn test_concurrent_readers() {
        let engine = Arc::new(StorageEngine::new());
        engine.set("shared", "value");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        assert_eq!(engine.get("shared"), Some("value".to_string()));
                        assert_eq!(engine.get("never-set"), None);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
