//! Read-through page orchestration.
//!
//! `StoryService` is the component between the HTTP surface and the
//! upstream API. It resolves the ranked id list (cache, then upstream,
//! then the backup slot), windows it into the requested page, fans out
//! concurrent detail fetches for ids the cache cannot answer, and caches
//! only the fetches that succeed. Upstream failures never propagate to the
//! caller: the service degrades to the last known-good ranking or an empty
//! page instead.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::cancel::CancelToken;
use crate::client::{UpstreamClient, UpstreamError};
use crate::entry::{CacheValue, Entry};
use crate::key::CacheKey;
use crate::store::CacheStore;
use crate::story::Story;
use crate::utils::now_ms;

/// Error returned to callers of [`StoryService::page`].
///
/// The only failure a caller can see is an invalid page request; everything
/// upstream-facing is absorbed by the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("pageSize and page must both be >= 1 (got pageSize={page_size}, page={page})")]
    InvalidRequest { page_size: i64, page: i64 },
}

/// Read-through orchestrator serving paginated, score-ordered story pages.
pub struct StoryService {
    store: Arc<dyn CacheStore>,
    upstream: Arc<dyn UpstreamClient>,
    list_ttl_ms: i64,
    story_ttl_ms: i64,
}

impl StoryService {
    /// Create a new service.
    ///
    /// # Arguments
    /// * `store` - Shared cache store; lifecycle owned by the caller
    /// * `upstream` - Upstream client for list and detail fetches
    /// * `list_ttl` - Expiration for the primary ranked id list
    /// * `story_ttl` - Expiration for cached detail records
    pub fn new(
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        list_ttl: Duration,
        story_ttl: Duration,
    ) -> Self {
        StoryService {
            store,
            upstream,
            list_ttl_ms: list_ttl.as_millis() as i64,
            story_ttl_ms: story_ttl.as_millis() as i64,
        }
    }

    /// Serve one page of best stories, sorted by score descending.
    ///
    /// Pagination windows the ranked id list, not the sorted result: page
    /// `n` selects the next `page_size` ids in upstream rank order and only
    /// that subset is score-sorted, so ordering is not monotonic across
    /// pages.
    pub async fn page(&self, page_size: i64, page: i64) -> Result<Vec<Story>, PageError> {
        self.page_with_cancel(page_size, page, CancelToken::never())
            .await
    }

    /// Like [`page`](Self::page), with a caller-supplied cancellation
    /// signal.
    ///
    /// Cancellation propagates into every in-flight detail fetch; a
    /// cancelled fetch is treated as a failed fetch (nothing cached,
    /// nothing contributed). The join waits for all fetches to settle, so a
    /// cancellation that fires before any fetch completes yields an empty
    /// page rather than a partial one.
    pub async fn page_with_cancel(
        &self,
        page_size: i64,
        page: i64,
        cancel: CancelToken,
    ) -> Result<Vec<Story>, PageError> {
        if page_size < 1 || page < 1 {
            return Err(PageError::InvalidRequest { page_size, page });
        }

        let ids = self.resolve_ids().await;

        let offset = (page as usize - 1).saturating_mul(page_size as usize);
        let window = ids
            .into_iter()
            .skip(offset)
            .take(page_size as usize);

        let mut stories = Vec::new();
        let mut pending = Vec::new();
        for id in window {
            match self.store.get(&CacheKey::Story(id)).await {
                Ok(Some(value)) => {
                    if let Some(story) = value.into_story() {
                        stories.push(story);
                        continue;
                    }
                    tracing::warn!(id, "unexpected cache value shape under story key");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(id, error = %e, "cache read failed, fetching from upstream");
                }
            }

            let upstream = Arc::clone(&self.upstream);
            let token = cancel.clone();
            pending.push(tokio::spawn(fetch_detail(upstream, id, token)));
        }

        // Wait for every in-flight fetch to settle. Only successes are
        // cached and contribute to the page; a later request for a failed
        // id retries the upstream.
        for joined in join_all(pending).await {
            match joined {
                Ok(Some((id, story))) => {
                    let entry = Entry::new(
                        CacheValue::Story(story.clone()),
                        Some(now_ms() + self.story_ttl_ms),
                    );
                    if let Err(e) = self.store.set(CacheKey::Story(id), entry).await {
                        tracing::warn!(id, error = %e, "failed to cache story");
                    }
                    stories.push(story);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "detail fetch task aborted");
                }
            }
        }

        stories.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(stories)
    }

    /// Resolve the ranked id list: primary cache slot, then upstream, then
    /// the backup slot, then empty.
    async fn resolve_ids(&self) -> Vec<u64> {
        match self.store.get(&CacheKey::BestIds).await {
            Ok(Some(value)) => {
                if let Some(ids) = value.into_ids() {
                    return ids;
                }
                tracing::warn!("unexpected cache value shape under ranked list key");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed for ranked id list");
            }
        }

        match self.upstream.fetch_best_ids().await {
            Ok(ids) => {
                let deadline = now_ms() + self.list_ttl_ms;
                self.write_list(CacheKey::BestIds, &ids, Some(deadline)).await;
                // The backup slot only ever sees freshly fetched data.
                self.write_list(CacheKey::BestIdsBackup, &ids, None).await;
                ids
            }
            Err(e) => {
                tracing::warn!(error = %e, "ranked id list fetch failed, falling back to backup");
                self.fallback_ids().await
            }
        }
    }

    /// Degraded path: serve the last known-good ranking if one exists.
    async fn fallback_ids(&self) -> Vec<u64> {
        match self.store.get(&CacheKey::BestIdsBackup).await {
            Ok(Some(value)) => match value.into_ids() {
                Some(ids) => {
                    // Re-arm the primary slot so requests inside the window
                    // skip the network.
                    let deadline = now_ms() + self.list_ttl_ms;
                    self.write_list(CacheKey::BestIds, &ids, Some(deadline)).await;
                    ids
                }
                None => {
                    tracing::warn!("unexpected cache value shape under backup list key");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed for backup id list");
                Vec::new()
            }
        }
    }

    async fn write_list(&self, key: CacheKey, ids: &[u64], expires_at: Option<i64>) {
        let entry = Entry::new(CacheValue::Ids(ids.to_vec()), expires_at);
        if let Err(e) = self.store.set(key, entry).await {
            tracing::warn!(key = %key, error = %e, "failed to cache ranked id list");
        }
    }
}

/// Fetch and decode one item's detail record.
///
/// Never errors outward: non-success status, transport failure, decode
/// failure, and cancellation all resolve to `None` after recording a
/// diagnostic.
async fn fetch_detail(
    upstream: Arc<dyn UpstreamClient>,
    id: u64,
    mut cancel: CancelToken,
) -> Option<(u64, Story)> {
    let result = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(id, "detail fetch cancelled");
            return None;
        }
        result = upstream.fetch_item(id) => result,
    };

    match result {
        Ok(raw) => Some((id, Story::from(raw))),
        Err(e @ UpstreamError::Status { .. }) => {
            tracing::warn!(id, error = %e, "detail fetch returned non-success status");
            None
        }
        Err(e) => {
            tracing::warn!(id, error = %e, "detail fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::RawItem;
    use crate::stores::memory::{HashMapStore, HashMapStoreConfig};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Upstream that always fails; the service must never reach it in the
    /// warm-cache tests below.
    struct UnreachableUpstream {
        calls: AtomicUsize,
    }

    impl UnreachableUpstream {
        fn new() -> Self {
            UnreachableUpstream {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl UpstreamClient for UnreachableUpstream {
        async fn fetch_best_ids(&self) -> Result<Vec<u64>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(UpstreamError::Status {
                status: 503,
                endpoint: "list".to_string(),
            })
        }

        async fn fetch_item(&self, _id: u64) -> Result<RawItem, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(UpstreamError::Status {
                status: 503,
                endpoint: "item".to_string(),
            })
        }
    }

    fn story(score: i64) -> Story {
        Story {
            title: Some(format!("Story scoring {}", score)),
            uri: None,
            posted_by: Some("tester".to_string()),
            comment_count: 0,
            score,
            posted_at: None,
        }
    }

    async fn seed_warm_cache(store: &HashMapStore, ids: &[u64]) {
        let now = now_ms();
        store
            .set(
                CacheKey::BestIds,
                Entry::new(CacheValue::Ids(ids.to_vec()), Some(now + 60_000)),
            )
            .await
            .unwrap();
        for &id in ids {
            store
                .set(
                    CacheKey::Story(id),
                    Entry::new(CacheValue::Story(story(id as i64)), Some(now + 60_000)),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_invalid_request_has_no_side_effects() {
        let store = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        let upstream = Arc::new(UnreachableUpstream::new());
        let service = StoryService::new(
            store.clone(),
            upstream.clone(),
            Duration::from_secs(300),
            Duration::from_secs(3600),
        );

        let result = service.page(-10, 1).await;
        assert_eq!(
            result,
            Err(PageError::InvalidRequest {
                page_size: -10,
                page: 1
            })
        );

        let result = service.page(10, 0).await;
        assert!(result.is_err());

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_window_beyond_list_is_empty() {
        let store = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        seed_warm_cache(&store, &[1, 2, 3]).await;

        let service = StoryService::new(
            store,
            Arc::new(UnreachableUpstream::new()),
            Duration::from_secs(300),
            Duration::from_secs(3600),
        );

        let page = service.page(10, 5).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_page_subset_sorted_by_score_descending() {
        let store = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        // Rank order deliberately disagrees with score order.
        seed_warm_cache(&store, &[3, 1, 2]).await;

        let upstream = Arc::new(UnreachableUpstream::new());
        let service = StoryService::new(
            store,
            upstream.clone(),
            Duration::from_secs(300),
            Duration::from_secs(3600),
        );

        let page = service.page(3, 1).await.unwrap();
        let scores: Vec<i64> = page.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![3, 2, 1]);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_result_length_bounded_by_page_size() {
        let store = Arc::new(HashMapStore::new(HashMapStoreConfig::default()));
        seed_warm_cache(&store, &[1, 2, 3, 4, 5]).await;

        let service = StoryService::new(
            store,
            Arc::new(UnreachableUpstream::new()),
            Duration::from_secs(300),
            Duration::from_secs(3600),
        );

        let page = service.page(2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
    }
}
