//! Resolution cache with single-flight semantics
//!
//! One completed candidate per cache key for the life of the process.
//! Concurrent resolutions of the same key collapse onto a single computation
//! and share its published value; failed computations leave nothing behind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::ResolveError;
use crate::types::{CacheKey, MetadataCandidate};

/// A resolved candidate plus when it was published.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub candidate: MetadataCandidate,
    pub inserted_at: Instant,
}

/// Keyed result store guaranteeing at most one in-flight computation per key.
#[derive(Default)]
pub struct ResolutionCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<CacheEntry>>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached candidate for `key`, or run `compute` to produce
    /// it.
    ///
    /// If the computation fails, or its future is dropped mid-flight, the
    /// slot stays empty and the next caller recomputes. Unresolved
    /// candidates are ordinary values and are cached like any other.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &CacheKey,
        compute: F,
    ) -> Result<MetadataCandidate, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MetadataCandidate, ResolveError>>,
    {
        let cell = {
            let mut entries = self.entries.lock();
            entries.entry(key.clone()).or_default().clone()
        };

        let entry = cell
            .get_or_try_init(|| async {
                let candidate = compute().await?;
                debug!(
                    key = %key.as_str(),
                    tier = ?candidate.tier,
                    "Caching resolution result"
                );
                Ok::<_, ResolveError>(CacheEntry {
                    candidate,
                    inserted_at: Instant::now(),
                })
            })
            .await?;

        Ok(entry.candidate.clone())
    }

    /// Cached candidate for `key`, if a resolution already completed.
    pub fn peek(&self, key: &CacheKey) -> Option<MetadataCandidate> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .and_then(|cell| cell.get())
            .map(|entry| entry.candidate.clone())
    }

    /// Drop the entry for `key` so the next resolution recomputes it.
    pub fn invalidate(&self, key: &CacheKey) {
        if self.entries.lock().remove(key).is_some() {
            debug!(key = %key.as_str(), "Invalidated cache entry");
        }
    }

    /// Number of keys with a completed or in-flight resolution.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawQuery;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn key(raw: &str) -> CacheKey {
        CacheKey::from_query(&RawQuery::new(raw))
    }

    fn candidate(title: &str) -> MetadataCandidate {
        MetadataCandidate::unresolved(title)
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let cache = ResolutionCache::new();
        let computes = AtomicUsize::new(0);
        let k = key("Artist - Song");

        for _ in 0..3 {
            let result = cache
                .get_or_compute(&k, || {
                    computes.fetch_add(1, Ordering::SeqCst);
                    async { Ok(candidate("Song")) }
                })
                .await
                .unwrap();
            assert_eq!(result.title, "Song");
        }

        assert_eq!(computes.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_coalesce() {
        let cache = Arc::new(ResolutionCache::new());
        let computes = Arc::new(AtomicUsize::new(0));
        let k = key("Artist - Song");

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let computes = computes.clone();
                let k = k.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_compute(&k, || {
                            computes.fetch_add(1, Ordering::SeqCst);
                            async {
                                tokio::time::sleep(Duration::from_millis(20)).await;
                                Ok(candidate("Song"))
                            }
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().title, "Song");
        }
        assert_eq!(computes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_computation_is_not_cached() {
        let cache = ResolutionCache::new();
        let k = key("Artist - Song");

        let failed = cache
            .get_or_compute(&k, || async {
                Err(ResolveError::InvalidQuery("boom".to_string()))
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.peek(&k), None);

        let recovered = cache
            .get_or_compute(&k, || async { Ok(candidate("Song")) })
            .await
            .unwrap();
        assert_eq!(recovered.title, "Song");
        assert!(cache.peek(&k).is_some());
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let cache = ResolutionCache::new();
        let computes = AtomicUsize::new(0);
        let k = key("Artist - Song");

        for _ in 0..2 {
            cache
                .get_or_compute(&k, || {
                    computes.fetch_add(1, Ordering::SeqCst);
                    async { Ok(candidate("Song")) }
                })
                .await
                .unwrap();
        }
        assert_eq!(computes.load(Ordering::SeqCst), 1);

        cache.invalidate(&k);
        cache
            .get_or_compute(&k, || {
                computes.fetch_add(1, Ordering::SeqCst);
                async { Ok(candidate("Song")) }
            })
            .await
            .unwrap();
        assert_eq!(computes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_share_entries() {
        let cache = ResolutionCache::new();

        cache
            .get_or_compute(&key("Artist - Song A"), || async {
                Ok(candidate("Song A"))
            })
            .await
            .unwrap();
        cache
            .get_or_compute(&key("Artist - Song B"), || async {
                Ok(candidate("Song B"))
            })
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&key("Artist - Song A")).unwrap().title, "Song A");
        assert_eq!(cache.peek(&key("Artist - Song B")).unwrap().title, "Song B");
    }
}
