//! Bounded TTL cache for derived lookups.
//!
//! Entries expire after a fixed TTL and the cache never holds more than
//! `capacity` entries: inserting into a full cache first drops expired
//! entries, then the oldest insertion.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

pub struct BoundedTtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
    capacity: usize,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K, V> BoundedTtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now()).await;
    }

    async fn insert_at(&self, key: K, value: V, inserted_at: Instant) {
        let mut guard = self.entries.write().await;

        if !guard.contains_key(&key) && guard.len() >= self.capacity {
            let ttl = self.ttl;
            guard.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

            if guard.len() >= self.capacity {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    guard.remove(&oldest);
                }
            }
        }

        guard.insert(key, TtlEntry { value, inserted_at });
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Current number of entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_get() {
        let cache: BoundedTtlCache<String, i32> = BoundedTtlCache::new(4, Duration::from_secs(60));
        cache.insert("key".to_string(), 42).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(42));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_entries_not_returned() {
        let ttl = Duration::from_millis(10);
        let cache: BoundedTtlCache<String, i32> = BoundedTtlCache::new(4, ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("key".to_string(), 42, expired_at).await;

        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn full_cache_evicts_oldest_entry() {
        let cache: BoundedTtlCache<&'static str, i32> =
            BoundedTtlCache::new(2, Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("first", 1, now - Duration::from_secs(2)).await;
        cache.insert_at("second", 2, now - Duration::from_secs(1)).await;

        cache.insert("third", 3).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"first").await, None);
        assert_eq!(cache.get(&"second").await, Some(2));
        assert_eq!(cache.get(&"third").await, Some(3));
    }

    #[tokio::test]
    async fn full_cache_prefers_dropping_expired_entries() {
        let ttl = Duration::from_secs(10);
        let cache: BoundedTtlCache<&'static str, i32> = BoundedTtlCache::new(3, ttl);
        let now = Instant::now();
        cache.insert_at("stale-1", 1, now - Duration::from_secs(30)).await;
        cache.insert_at("stale-2", 2, now - Duration::from_secs(20)).await;
        cache.insert("fresh", 3).await;

        cache.insert("new", 4).await;

        // Both expired entries go, not just the single oldest one
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"fresh").await, Some(3));
        assert_eq!(cache.get(&"new").await, Some(4));
    }

    #[tokio::test]
    async fn overwriting_existing_key_does_not_evict() {
        let cache: BoundedTtlCache<&'static str, i32> =
            BoundedTtlCache::new(2, Duration::from_secs(60));
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        cache.insert("a", 10).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"a").await, Some(10));
        assert_eq!(cache.get(&"b").await, Some(2));
    }
}
