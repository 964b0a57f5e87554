//! Bounded memoization of classification results.
//!
//! LRU over `(description, business type)`, shared by every concurrently
//! handled request. Misses for the same key coalesce on a per-key guard
//! so the generative backend is called at most once per distinct input.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;

use marca_common::category::{BusinessType, NizaCategory};

type Key = (String, BusinessType);

pub struct ClassificationCache {
    entries: Mutex<LruCache<Key, NizaCategory>>,
    in_flight: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}

impl ClassificationCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, description: &str, business_type: BusinessType) -> Option<NizaCategory> {
        let mut entries = self.entries.lock().await;
        entries
            .get(&(description.to_string(), business_type))
            .cloned()
    }

    pub async fn insert(
        &self,
        description: &str,
        business_type: BusinessType,
        category: NizaCategory,
    ) {
        let key = (description.to_string(), business_type);
        self.entries.lock().await.put(key.clone(), category);
        // Late waiters still hold the guard Arc; they re-check the cache
        // after acquiring it and hit the fresh entry.
        self.in_flight.lock().await.remove(&key);
    }

    /// Per-key guard for coalescing concurrent misses. Callers lock the
    /// returned mutex, re-check the cache, and only then call the model.
    pub async fn flight_guard(
        &self,
        description: &str,
        business_type: BusinessType,
    ) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry((description.to_string(), business_type))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marca_common::niza;

    fn cache(capacity: usize) -> ClassificationCache {
        ClassificationCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn category(code: u8) -> NizaCategory {
        NizaCategory {
            code,
            name: niza::class_name(code).unwrap().to_string(),
            additional_codes: vec![],
            note: String::new(),
            source: marca_common::category::CategorySource::Fallback,
        }
    }

    #[tokio::test]
    async fn test_get_returns_inserted_value() {
        let cache = cache(10);
        cache
            .insert("cafetería", BusinessType::Service, category(43))
            .await;

        let hit = cache.get("cafetería", BusinessType::Service).await;
        assert_eq!(hit.unwrap().code, 43);
    }

    #[tokio::test]
    async fn test_key_includes_business_type() {
        let cache = cache(10);
        cache
            .insert("café", BusinessType::Product, category(30))
            .await;

        assert!(cache.get("café", BusinessType::Service).await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = cache(2);
        cache.insert("a", BusinessType::Service, category(35)).await;
        cache.insert("b", BusinessType::Service, category(36)).await;

        // Touch "a" so "b" becomes the eviction candidate.
        cache.get("a", BusinessType::Service).await;
        cache.insert("c", BusinessType::Service, category(37)).await;

        assert!(cache.get("a", BusinessType::Service).await.is_some());
        assert!(cache.get("b", BusinessType::Service).await.is_none());
        assert!(cache.get("c", BusinessType::Service).await.is_some());
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_flight_guard_is_shared_per_key() {
        let cache = cache(10);
        let a = cache.flight_guard("x", BusinessType::Service).await;
        let b = cache.flight_guard("x", BusinessType::Service).await;
        let other = cache.flight_guard("y", BusinessType::Service).await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[tokio::test]
    async fn test_insert_clears_flight_guard() {
        let cache = cache(10);
        let before = cache.flight_guard("x", BusinessType::Service).await;
        cache.insert("x", BusinessType::Service, category(35)).await;
        let after = cache.flight_guard("x", BusinessType::Service).await;

        assert!(!Arc::ptr_eq(&before, &after));
    }
}
