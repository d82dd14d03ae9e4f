//! Metrics middleware for cache stores.
//!
//! This module provides a `MetricsStore` wrapper that emits metrics for
//! cache reads and writes to a user-provided sink. The default
//! `TracingSink` logs every operation at debug level.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use beststories::{CacheStore, HashMapStore, HashMapStoreConfig};
//! use beststories::{MetricsStore, TracingSink};
//!
//! let inner = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
//! let store: Arc<dyn CacheStore> = Arc::new(MetricsStore::new(inner, Arc::new(TracingSink)));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::entry::{CacheValue, Entry};
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::store::CacheStore;

/// Metrics emitted by the MetricsStore wrapper.
#[derive(Debug, Clone)]
pub enum CacheMetric {
    /// Emitted on every cache read (get) operation.
    Read {
        /// The cache key that was read.
        key: String,
        /// Whether the key was found in the cache.
        hit: bool,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store (from CacheStore::name()).
        tier: String,
    },
    /// Emitted on every cache write (set) operation.
    Write {
        /// The cache key that was written.
        key: String,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store (from CacheStore::name()).
        tier: String,
    },
}

/// Trait for receiving cache metrics.
///
/// This is called synchronously in the hot path of cache operations.
/// Implementations should be fast (e.g., buffer metrics in memory or log).
pub trait MetricsSink: Send + Sync {
    /// Emit a single metric.
    fn emit(&self, metric: CacheMetric);
}

/// A sink that logs metrics through `tracing` at debug level.
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn emit(&self, metric: CacheMetric) {
        match metric {
            CacheMetric::Read {
                key,
                hit,
                latency_ms,
                tier,
            } => {
                tracing::debug!(%key, hit, latency_ms, tier, "cache read");
            }
            CacheMetric::Write {
                key,
                latency_ms,
                tier,
            } => {
                tracing::debug!(%key, latency_ms, tier, "cache write");
            }
        }
    }
}

/// A store wrapper that emits metrics for all operations.
///
/// `MetricsStore` wraps any `CacheStore` implementation and emits metrics
/// for read and write operations to a user-provided sink.
pub struct MetricsStore {
    inner: Arc<dyn CacheStore>,
    sink: Arc<dyn MetricsSink>,
    tier_name: String,
}

impl MetricsStore {
    /// Create a new MetricsStore wrapping the given store.
    ///
    /// # Arguments
    /// * `inner` - The store to wrap
    /// * `sink` - The metrics sink to emit metrics to
    pub fn new(inner: Arc<dyn CacheStore>, sink: Arc<dyn MetricsSink>) -> Self {
        let tier_name = inner.name().to_string();
        MetricsStore {
            inner,
            sink,
            tier_name,
        }
    }

    fn elapsed_ms(start: Instant) -> f64 {
        start.elapsed().as_secs_f64() * 1000.0
    }
}

#[async_trait]
impl CacheStore for MetricsStore {
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError> {
        let start = Instant::now();
        let result = self.inner.get(key).await;
        let latency_ms = Self::elapsed_ms(start);

        let hit = matches!(&result, Ok(Some(_)));
        self.sink.emit(CacheMetric::Read {
            key: key.to_string(),
            hit,
            latency_ms,
            tier: self.tier_name.clone(),
        });

        result
    }

    async fn set(&self, key: CacheKey, entry: Entry) -> Result<(), CacheError> {
        let start = Instant::now();
        let result = self.inner.set(key, entry).await;
        let latency_ms = Self::elapsed_ms(start);

        self.sink.emit(CacheMetric::Write {
            key: key.to_string(),
            latency_ms,
            tier: self.tier_name.clone(),
        });

        result
    }

    async fn count(&self) -> Result<usize, CacheError> {
        self.inner.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::{HashMapStore, HashMapStoreConfig};
    use crate::utils::now_ms;
    use std::sync::Mutex;

    struct TestSink {
        metrics: Mutex<Vec<CacheMetric>>,
    }

    impl TestSink {
        fn new() -> Self {
            TestSink {
                metrics: Mutex::new(Vec::new()),
            }
        }

        fn take_metrics(&self) -> Vec<CacheMetric> {
            std::mem::take(&mut *self.metrics.lock().unwrap())
        }
    }

    impl MetricsSink for TestSink {
        fn emit(&self, metric: CacheMetric) {
            self.metrics.lock().unwrap().push(metric);
        }
    }

    #[tokio::test]
    async fn test_read_miss() {
        let inner: Arc<dyn CacheStore> = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        let sink = Arc::new(TestSink::new());
        let store = MetricsStore::new(inner, sink.clone());

        let result = store.get(&CacheKey::Story(1)).await.unwrap();
        assert!(result.is_none());

        let metrics = sink.take_metrics();
        assert_eq!(metrics.len(), 1);

        match &metrics[0] {
            CacheMetric::Read {
                key,
                hit,
                tier,
                latency_ms,
            } => {
                assert_eq!(key, "story:1");
                assert!(!hit);
                assert_eq!(tier, "hashmap");
                assert!(*latency_ms >= 0.0);
            }
            _ => panic!("Expected Read metric"),
        }
    }

    #[tokio::test]
    async fn test_read_hit() {
        let inner: Arc<dyn CacheStore> = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        let sink = Arc::new(TestSink::new());
        let store = MetricsStore::new(inner.clone(), sink.clone());

        let now = now_ms();
        let entry = Entry::new(CacheValue::Ids(vec![1]), Some(now + 60_000));
        inner.set(CacheKey::BestIds, entry).await.unwrap();

        let result = store.get(&CacheKey::BestIds).await.unwrap();
        assert!(result.is_some());

        let metrics = sink.take_metrics();
        assert_eq!(metrics.len(), 1);

        match &metrics[0] {
            CacheMetric::Read { key, hit, .. } => {
                assert_eq!(key, "best-ids");
                assert!(hit);
            }
            _ => panic!("Expected Read metric"),
        }
    }

    #[tokio::test]
    async fn test_write_metric() {
        let inner: Arc<dyn CacheStore> = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        let sink = Arc::new(TestSink::new());
        let store = MetricsStore::new(inner, sink.clone());

        let now = now_ms();
        let entry = Entry::new(CacheValue::Ids(vec![1]), Some(now + 60_000));
        store.set(CacheKey::BestIds, entry).await.unwrap();

        let metrics = sink.take_metrics();
        assert_eq!(metrics.len(), 1);

        match &metrics[0] {
            CacheMetric::Write {
                key,
                tier,
                latency_ms,
            } => {
                assert_eq!(key, "best-ids");
                assert_eq!(tier, "hashmap");
                assert!(*latency_ms >= 0.0);
            }
            _ => panic!("Expected Write metric"),
        }
    }

    #[tokio::test]
    async fn test_count_passthrough() {
        let inner: Arc<dyn CacheStore> = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        let sink = Arc::new(TestSink::new());
        let store = MetricsStore::new(inner, sink.clone());

        let now = now_ms();
        let entry = Entry::new(CacheValue::Ids(vec![1]), Some(now + 60_000));
        store.set(CacheKey::BestIds, entry).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
