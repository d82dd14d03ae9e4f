use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::entry::{CacheValue, Entry};
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::store::CacheStore;
use crate::utils::now_ms;

/// Configuration for eviction on set operations.
#[derive(Debug, Clone)]
pub struct EvictOnSetConfig {
    /// Provide a number between 0 and 1 to calculate whether eviction should run on each set.
    ///
    /// - `1.0` -> run eviction on every `set`
    /// - `0.5` -> run eviction on every 2nd `set` (on average)
    /// - `0.0` -> disable eviction
    pub frequency: f64,

    /// Remove items until the number of items in the map is lower than `max_items`.
    pub max_items: usize,
}

/// Configuration for HashMapStore.
#[derive(Debug, Clone, Default)]
pub struct HashMapStoreConfig {
    /// Remove expired entries on every `set` operation.
    pub evict_on_set: Option<EvictOnSetConfig>,
}

/// Thread-safe in-memory cache store using HashMap with RwLock.
///
/// This is the default backend, suitable for:
/// - Low to moderate concurrency (<8 threads)
/// - Small to medium cache sizes (<1000 items)
///
/// For high-concurrency scenarios, consider using `MokaStore` instead.
pub struct HashMapStore {
    state: RwLock<HashMap<CacheKey, Entry>>,
    evict_on_set: Option<EvictOnSetConfig>,
}

impl HashMapStore {
    /// Create a new HashMapStore with the given configuration.
    pub fn new(config: HashMapStoreConfig) -> Self {
        HashMapStore {
            state: RwLock::new(HashMap::new()),
            evict_on_set: config.evict_on_set,
        }
    }

    /// Run eviction if configured and random check passes.
    async fn maybe_evict(&self) {
        let Some(ref config) = self.evict_on_set else {
            return;
        };

        if config.frequency <= 0.0 {
            return;
        }

        let should_evict = config.frequency >= 1.0 || rand::random::<f64>() < config.frequency;
        if !should_evict {
            return;
        }

        let mut state = self.state.write().await;
        let now = now_ms();

        // First delete all expired entries
        state.retain(|_, entry| !entry.is_expired(now));

        // If still over max_items, remove soonest-expiring entries first.
        // Entries with no expiration (the backup list) are evicted last.
        if state.len() > config.max_items {
            let mut entries: Vec<_> = state
                .iter()
                .map(|(k, e)| (*k, e.expires_at.unwrap_or(i64::MAX)))
                .collect();
            entries.sort_by_key(|(_, deadline)| *deadline);

            let to_remove = state.len() - config.max_items;
            for (key, _) in entries.into_iter().take(to_remove) {
                state.remove(&key);
            }
        }
    }
}

#[async_trait]
impl CacheStore for HashMapStore {
    fn name(&self) -> &'static str {
        "hashmap"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError> {
        let state = self.state.read().await;

        let Some(entry) = state.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(now_ms()) {
            // Entry is expired, remove it
            drop(state);
            let mut state = self.state.write().await;
            state.remove(key);
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: CacheKey, entry: Entry) -> Result<(), CacheError> {
        {
            let mut state = self.state.write().await;
            state.insert(key, entry);
        }

        self.maybe_evict().await;
        Ok(())
    }

    async fn count(&self) -> Result<usize, CacheError> {
        let state = self.state.read().await;
        let now = now_ms();
        Ok(state.values().filter(|e| !e.is_expired(now)).count())
    }
}
