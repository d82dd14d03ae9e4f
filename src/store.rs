use async_trait::async_trait;

use crate::entry::{CacheValue, Entry};
use crate::error::CacheError;
use crate::key::CacheKey;

/// A store is a common interface for reading and writing cache entries.
///
/// Expiration is wall-clock absolute-time based: implementations must treat
/// entries past their `expires_at` instant as absent on lookup. Nothing in
/// the service deletes entries explicitly, so there is no remove operation;
/// stores are free to apply eviction pressure of their own.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// A name for metrics/tracing.
    ///
    /// # Example
    /// - "hashmap"
    /// - "moka"
    fn name(&self) -> &'static str;

    /// Return the cached value.
    ///
    /// The response must be `None` for misses and for expired entries.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError>;

    /// Insert or replace the entry for the given key.
    async fn set(&self, key: CacheKey, entry: Entry) -> Result<(), CacheError>;

    /// Number of live entries. For observability and tests only.
    async fn count(&self) -> Result<usize, CacheError>;
}
