//! Concurrency and lifecycle tests for the forecast grid cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use forecast_common::{
    plan_request, CycleHour, FetchError, ForecastCycle, ForecastRequest, GridFetcher, WindLevel,
};
use grid_processor::ForecastGridCache;
use test_utils::{
    create_quad_grid, utc, CountingFetcher, FlakyFetcher, GatedFetcher, ManualClock,
    PanickingFetcher,
};

fn cycle() -> ForecastCycle {
    ForecastCycle::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), CycleHour::Z06)
}

fn request_at(offset_hours: i64) -> ForecastRequest {
    let run = cycle();
    plan_request(
        run.run_start() + chrono::Duration::hours(offset_hours),
        &run,
        WindLevel::M10,
    )
    .unwrap()
}

fn cache_at(now: DateTime<Utc>) -> (ForecastGridCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    (ForecastGridCache::new(clock.clone()), clock)
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Single-flight tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_fetch() {
    let (cache, _clock) = cache_at(utc(2024, 6, 1, 13, 0, 0));
    let fetcher = Arc::new(CountingFetcher::with_delay(
        create_quad_grid(),
        Duration::from_millis(50),
    ));
    let request = request_at(7);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let cache = cache.clone();
        let fetcher: Arc<dyn GridFetcher> = fetcher.clone();
        let request = request.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_fetch(&request.key, request.expiration, fetcher)
                .await
        }));
    }

    let mut grids = Vec::new();
    for handle in handles {
        grids.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(fetcher.calls(), 1);
    for grid in &grids[1..] {
        assert!(Arc::ptr_eq(&grids[0], grid));
    }

    let stats = cache.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.hits + stats.coalesced, 31);
    assert_eq!(cache.pending_fetches().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_different_keys_do_not_block_each_other() {
    let (cache, _clock) = cache_at(utc(2024, 6, 1, 13, 0, 0));
    let gated = Arc::new(GatedFetcher::new(create_quad_grid()));
    let counting = Arc::new(CountingFetcher::new(create_quad_grid()));
    let slow = request_at(7);
    let fast = request_at(8);

    let blocked = {
        let cache = cache.clone();
        let gated = gated.clone();
        let slow = slow.clone();
        tokio::spawn(async move { cache.get_or_fetch(&slow.key, slow.expiration, gated).await })
    };
    wait_until(|| {
        let gated = gated.clone();
        async move { gated.calls() == 1 }
    })
    .await;

    let grid = tokio::time::timeout(
        Duration::from_secs(2),
        cache.get_or_fetch(&fast.key, fast.expiration, counting.clone()),
    )
    .await
    .expect("independent key was blocked")
    .unwrap();
    assert_eq!(grid.width(), 2);

    gated.release();
    blocked.await.unwrap().unwrap();
    assert_eq!(cache.len().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_waiter_does_not_cancel_fetch() {
    let (cache, _clock) = cache_at(utc(2024, 6, 1, 13, 0, 0));
    let fetcher = Arc::new(GatedFetcher::new(create_quad_grid()));
    let request = request_at(7);

    // First caller gives up before the fetch completes
    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        cache.get_or_fetch(&request.key, request.expiration, fetcher.clone()),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(cache.pending_fetches().await, 1);
    wait_until(|| {
        let fetcher = fetcher.clone();
        async move { fetcher.calls() == 1 }
    })
    .await;

    let waiter = {
        let cache = cache.clone();
        let fetcher = fetcher.clone();
        let request = request.clone();
        tokio::spawn(async move {
            cache
                .get_or_fetch(&request.key, request.expiration, fetcher)
                .await
        })
    };
    wait_until(|| {
        let cache = cache.clone();
        async move { cache.stats().await.coalesced == 1 }
    })
    .await;

    fetcher.release();
    let grid = waiter.await.unwrap().unwrap();
    assert_eq!(grid.width(), 2);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(cache.pending_fetches().await, 0);
}

// ============================================================================
// Expiration tests
// ============================================================================

#[tokio::test]
async fn test_offset_five_expires_after_six_hours() {
    let run_start = cycle().run_start();
    let (cache, clock) = cache_at(run_start + chrono::Duration::hours(5));
    let fetcher = Arc::new(CountingFetcher::new(create_quad_grid()));
    let request = request_at(5);
    assert_eq!(request.expiration, run_start + chrono::Duration::hours(6));

    cache
        .get_or_fetch(&request.key, request.expiration, fetcher.clone())
        .await
        .unwrap();

    clock.set(run_start + chrono::Duration::hours(6) - chrono::Duration::seconds(1));
    cache
        .get_or_fetch(&request.key, request.expiration, fetcher.clone())
        .await
        .unwrap();
    assert_eq!(fetcher.calls(), 1);

    clock.set(run_start + chrono::Duration::hours(6) + chrono::Duration::seconds(1));
    cache
        .get_or_fetch(&request.key, request.expiration, fetcher.clone())
        .await
        .unwrap();
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_expired_entry_removed_on_access() {
    let run_start = cycle().run_start();
    let (cache, clock) = cache_at(run_start);
    let fetcher = Arc::new(CountingFetcher::new(create_quad_grid()));
    let request = request_at(0);

    cache
        .get_or_fetch(&request.key, request.expiration, fetcher)
        .await
        .unwrap();
    assert!(cache.live_entry(&request.key).await.is_some());

    clock.set(request.expiration);
    assert!(cache.live_entry(&request.key).await.is_none());
    assert_eq!(cache.len().await, 0);
    assert_eq!(cache.stats().await.evictions, 1);
}

// ============================================================================
// Failure tests
// ============================================================================

#[tokio::test]
async fn test_failures_are_not_cached() {
    let (cache, _clock) = cache_at(utc(2024, 6, 1, 13, 0, 0));
    let fetcher = Arc::new(FlakyFetcher::new(create_quad_grid(), 1));
    let request = request_at(7);

    let first = cache
        .get_or_fetch(&request.key, request.expiration, fetcher.clone())
        .await;
    assert!(matches!(first, Err(FetchError::Network(_))));
    assert!(cache.is_empty().await);

    let second = cache
        .get_or_fetch(&request.key, request.expiration, fetcher.clone())
        .await;
    assert!(second.is_ok());
    assert_eq!(fetcher.calls(), 2);

    let stats = cache.stats().await;
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_panicking_fetcher_releases_key() {
    let (cache, _clock) = cache_at(utc(2024, 6, 1, 13, 0, 0));
    let fetcher = Arc::new(PanickingFetcher::default());
    let request = request_at(7);

    for _ in 0..2 {
        let result = cache
            .get_or_fetch(&request.key, request.expiration, fetcher.clone())
            .await;
        assert!(matches!(result, Err(FetchError::Aborted(_))));
    }
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(cache.pending_fetches().await, 0);
}
