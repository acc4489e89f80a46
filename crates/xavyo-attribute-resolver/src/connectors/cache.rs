//! Result cache for search-based connectors

use moka::future::Cache;
use std::time::Duration;
use xavyo_attribute::AttributeMap;

/// Caches connector results keyed by the executed query.
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<String, AttributeMap>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl ResultCache {
    /// Create a cache with a time-to-live and a maximum number of entries.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    pub async fn get(&self, query: &str) -> Option<AttributeMap> {
        self.cache.get(query).await
    }

    pub async fn insert(&self, query: String, attributes: AttributeMap) {
        self.cache.insert(query, attributes).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
