//! Expiring, single-flight cache of decoded forecast grids.
//!
//! Each resource key maps to at most one decoded grid and at most one
//! in-flight fetch. Concurrent misses on the same key attach to the same
//! fetch; misses on different keys proceed independently.
//!
//! The fetch itself runs as a spawned task. Callers wait on a shared handle
//! to that task, so dropping a waiter never cancels the download for anyone
//! else. The task publishes the grid to `entries` before it removes its
//! `pending` slot, and both steps happen under their own locks, so a caller
//! holding the `pending` lock always sees either the in-flight handle or the
//! stored grid.
//!
//! Lock order is `pending` then `entries`. The fetch task never holds both.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use forecast_common::{Clock, FetchError, GridFetcher, ResourceKey, WindGrid};
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn, Instrument};

use crate::types::CacheStats;

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<WindGrid>, FetchError>>>;

struct CacheEntry {
    grid: Arc<WindGrid>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

struct Inner {
    entries: RwLock<HashMap<ResourceKey, CacheEntry>>,
    pending: Mutex<HashMap<ResourceKey, SharedFetch>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    fetch_failures: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

/// Process-local cache of forecast grids keyed by resource key.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct ForecastGridCache {
    inner: Arc<Inner>,
}

impl ForecastGridCache {
    /// Create an empty cache that judges expiry with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                clock,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                fetches: AtomicU64::new(0),
                fetch_failures: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    /// Return the live grid for `key`, fetching it with `fetcher` on a miss.
    ///
    /// `expires_at` is recorded with the grid if this call triggers the
    /// fetch. Failures are returned to every waiter and never stored.
    pub async fn get_or_fetch(
        &self,
        key: &ResourceKey,
        expires_at: DateTime<Utc>,
        fetcher: Arc<dyn GridFetcher>,
    ) -> Result<Arc<WindGrid>, FetchError> {
        if let Some(grid) = self.live_entry(key).await {
            self.record_hit(key);
            return Ok(grid);
        }

        let fetch = {
            let mut pending = self.inner.pending.lock().await;

            // A fetch may have published between the first check and the lock
            if let Some(grid) = self.live_entry(key).await {
                self.record_hit(key);
                return Ok(grid);
            }

            match pending.get(key) {
                Some(in_flight) => {
                    self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("wind_cache_coalesced_total").increment(1);
                    debug!(key = %key, "Joining in-flight fetch");
                    in_flight.clone()
                }
                None => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("wind_cache_misses_total").increment(1);
                    let fetch = self.spawn_fetch(key.clone(), expires_at, fetcher);
                    pending.insert(key.clone(), fetch.clone());
                    metrics::gauge!("wind_cache_pending_fetches").set(pending.len() as f64);
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Look up a live grid without fetching.
    ///
    /// An expired entry found here is removed.
    pub async fn live_entry(&self, key: &ResourceKey) -> Option<Arc<WindGrid>> {
        let now = self.inner.clock.now();
        {
            let entries = self.inner.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(Arc::clone(&entry.grid)),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.inner.entries.write().await;
        // Re-check under the write lock; a fresh grid may have replaced it
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(Arc::clone(&entry.grid)),
            Some(_) => {
                entries.remove(key);
                self.inner.evictions.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("wind_cache_evictions_total").increment(1);
                metrics::gauge!("wind_cache_entries").set(entries.len() as f64);
                debug!(key = %key, "Evicted expired grid on access");
                None
            }
            None => None,
        }
    }

    /// Remove every expired entry. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.inner.clock.now();
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let removed = before - entries.len();

        if removed > 0 {
            self.inner
                .evictions
                .fetch_add(removed as u64, Ordering::Relaxed);
            metrics::counter!("wind_cache_evictions_total").increment(removed as u64);
            info!(removed = removed, remaining = entries.len(), "Swept expired grids");
        }
        metrics::gauge!("wind_cache_entries").set(entries.len() as f64);

        removed
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.inner.entries.read().await;
        let memory_bytes = entries
            .values()
            .map(|entry| entry.grid.size_bytes() as u64)
            .sum();

        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            fetches: self.inner.fetches.load(Ordering::Relaxed),
            fetch_failures: self.inner.fetch_failures.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
            entries: entries.len(),
            memory_bytes,
        }
    }

    /// Number of stored grids, live or not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// Number of fetches currently in flight.
    pub async fn pending_fetches(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    fn record_hit(&self, key: &ResourceKey) {
        self.inner.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("wind_cache_hits_total").increment(1);
        debug!(key = %key, "Cache hit");
    }

    /// Start the fetch task for `key` and wrap its handle for sharing.
    ///
    /// Must be called with the `pending` lock held so the task cannot remove
    /// its slot before the caller has inserted it.
    fn spawn_fetch(
        &self,
        key: ResourceKey,
        expires_at: DateTime<Utc>,
        fetcher: Arc<dyn GridFetcher>,
    ) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let span = tracing::info_span!("grid_fetch", key = %key);

        let task = async move {
            inner.fetches.fetch_add(1, Ordering::Relaxed);
            info!(expires_at = %expires_at, "Fetching forecast grid");
            let started = Instant::now();

            let outcome = AssertUnwindSafe(fetcher.fetch(&key)).catch_unwind().await;
            let elapsed = started.elapsed();
            metrics::histogram!("wind_upstream_fetch_seconds").record(elapsed.as_secs_f64());

            let result = match outcome {
                Ok(Ok(grid)) => {
                    let grid = Arc::new(grid);
                    let mut entries = inner.entries.write().await;
                    entries.insert(
                        key.clone(),
                        CacheEntry {
                            grid: Arc::clone(&grid),
                            expires_at,
                        },
                    );
                    metrics::gauge!("wind_cache_entries").set(entries.len() as f64);
                    info!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        size_bytes = grid.size_bytes(),
                        "Stored forecast grid"
                    );
                    Ok(grid)
                }
                Ok(Err(err)) => {
                    inner.fetch_failures.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("wind_cache_fetch_failures_total").increment(1);
                    warn!(error = %err, elapsed_ms = elapsed.as_millis() as u64, "Grid fetch failed");
                    Err(err)
                }
                Err(_) => {
                    inner.fetch_failures.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("wind_cache_fetch_failures_total").increment(1);
                    error!("Grid fetcher panicked");
                    Err(FetchError::Aborted("grid fetcher panicked".to_string()))
                }
            };

            // Only now may a new fetch for this key start
            let mut pending = inner.pending.lock().await;
            pending.remove(&key);
            metrics::gauge!("wind_cache_pending_fetches").set(pending.len() as f64);

            result
        };

        let handle = tokio::spawn(task.instrument(span));

        async move {
            match handle.await {
                Ok(result) => result,
                Err(err) => Err(FetchError::Aborted(err.to_string())),
            }
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for ForecastGridCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastGridCache")
            .field("hits", &self.inner.hits.load(Ordering::Relaxed))
            .field("misses", &self.inner.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use forecast_common::{plan_request, select_cycle, WindLevel};
    use test_utils::{create_quad_grid, utc, CountingFetcher, ManualClock};

    #[tokio::test]
    async fn test_hit_after_fetch() {
        let now = utc(2024, 6, 1, 13, 0, 0);
        let clock = Arc::new(ManualClock::new(now));
        let cache = ForecastGridCache::new(clock.clone());
        let fetcher = Arc::new(CountingFetcher::new(create_quad_grid()));
        let request = plan_request(now, &select_cycle(now), WindLevel::M10).unwrap();

        let first = cache
            .get_or_fetch(&request.key, request.expiration, fetcher.clone())
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(&request.key, request.expiration, fetcher.clone())
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls(), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.memory_bytes, first.size_bytes() as u64);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let now = utc(2024, 6, 1, 13, 0, 0);
        let clock = Arc::new(ManualClock::new(now));
        let cache = ForecastGridCache::new(clock.clone());
        let fetcher = Arc::new(CountingFetcher::new(create_quad_grid()));
        let cycle = select_cycle(now);

        let soon = plan_request(now, &cycle, WindLevel::M10).unwrap();
        let later = plan_request(now + Duration::hours(3), &cycle, WindLevel::M10).unwrap();
        cache.get_or_fetch(&soon.key, soon.expiration, fetcher.clone()).await.unwrap();
        cache.get_or_fetch(&later.key, later.expiration, fetcher.clone()).await.unwrap();
        assert_eq!(cache.len().await, 2);

        clock.set(soon.expiration);
        assert_eq!(cache.sweep_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.live_entry(&later.key).await.is_some());
        assert_eq!(cache.stats().await.evictions, 1);
    }
}
