//! beststories - a read-through caching service for the Hacker News
//! "best stories" API.
//!
//! The service sits between HTTP callers and the upstream content API and
//! serves paginated, score-ordered story pages:
//! - The ranked id list lives in a short-lived primary cache slot; every
//!   successful fresh fetch also refreshes a never-expiring backup slot.
//! - When the upstream is unreachable, the service degrades to the backup
//!   ranking, or to an empty page. Callers never see upstream failures.
//! - Detail records are fetched concurrently per page, cached with a long
//!   expiration on success only, and retried on a later request when a
//!   fetch fails.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use beststories::{Config, HashMapStore, HashMapStoreConfig, HnClient, StoryService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env();
//!     let store = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
//!     let upstream = Arc::new(HnClient::new(&config).unwrap());
//!
//!     let service = StoryService::new(store, upstream, config.list_ttl, config.story_ttl);
//!     let page = service.page(10, 1).await.unwrap();
//!     println!("{} stories", page.len());
//! }
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod key;
pub mod service;
pub mod store;
pub mod stores;
pub mod story;
mod utils;

// Re-export public API
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use client::{HnClient, UpstreamClient, UpstreamError};
pub use config::{Config, ConfigError, StoreBackend};
pub use entry::{CacheValue, Entry};
pub use error::CacheError;
pub use key::CacheKey;
pub use service::{PageError, StoryService};
pub use store::CacheStore;
pub use stores::memory::{EvictOnSetConfig, HashMapStore, HashMapStoreConfig};
pub use stores::metrics::{CacheMetric, MetricsSink, MetricsStore, TracingSink};
pub use stores::moka::{MokaStore, MokaStoreConfig};
pub use story::{RawItem, Story};
