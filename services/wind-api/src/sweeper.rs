//! Periodic eviction of expired forecast grids.

use std::time::Duration;

use grid_processor::ForecastGridCache;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Spawn a task that sweeps `cache` every `period` until `shutdown` fires.
pub fn spawn_sweeper(
    cache: ForecastGridCache,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(period_secs = period.as_secs_f64(), "Cache sweeper started");
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutting down cache sweeper");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = cache.sweep_expired().await;
                    debug!(evicted = evicted, "Cache sweep complete");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use forecast_common::{
        CycleHour, ForecastCycle, ForecastOffset, ResourceKey, WindLevel,
    };
    use test_utils::{create_uniform_wind_grid, utc, CountingFetcher, ManualClock};

    #[tokio::test]
    async fn test_sweeper_evicts_and_stops() {
        let clock = Arc::new(ManualClock::new(utc(2024, 6, 1, 13, 0, 0)));
        let cache = ForecastGridCache::new(clock.clone());
        let fetcher = Arc::new(CountingFetcher::new(create_uniform_wind_grid(4, 2, 1.0, 1.0)));

        let cycle = ForecastCycle::new(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            CycleHour::Z06,
        );
        let key = ResourceKey::new(cycle, ForecastOffset::new(7).unwrap(), WindLevel::M10);
        cache
            .get_or_fetch(&key, utc(2024, 6, 1, 14, 0, 0), fetcher)
            .await
            .unwrap();
        assert_eq!(cache.len().await, 1);

        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let handle = spawn_sweeper(
            cache.clone(),
            Duration::from_millis(10),
            shutdown_tx.subscribe(),
        );

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.len().await, 1);

        clock.set(utc(2024, 6, 1, 14, 0, 1));
        for _ in 0..100 {
            if cache.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(cache.is_empty().await);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
