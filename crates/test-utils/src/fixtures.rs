//! Test doubles for the clock and the upstream grid source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use forecast_common::{Clock, FetchError, GridFetcher, ResourceKey, WindGrid};
use tokio::sync::Notify;

/// Shorthand for a UTC instant.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .expect("valid test instant")
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Returns a fixed grid after an optional delay, counting invocations.
pub struct CountingFetcher {
    grid: WindGrid,
    delay: Duration,
    calls: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl CountingFetcher {
    pub fn new(grid: WindGrid) -> Self {
        Self::with_delay(grid, Duration::ZERO)
    }

    pub fn with_delay(grid: WindGrid, delay: Duration) -> Self {
        Self {
            grid,
            delay,
            calls: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Keys requested so far, in call order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl GridFetcher for CountingFetcher {
    async fn fetch(&self, key: &ResourceKey) -> Result<WindGrid, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(key.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.grid.clone())
    }
}

/// Always fails with the configured error.
pub struct FailingFetcher {
    error: FetchError,
    calls: AtomicUsize,
}

impl FailingFetcher {
    pub fn new(error: FetchError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn network() -> Self {
        Self::new(FetchError::Network("connection refused".to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GridFetcher for FailingFetcher {
    async fn fetch(&self, _key: &ResourceKey) -> Result<WindGrid, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Fails the first `failures` calls, then returns the grid.
pub struct FlakyFetcher {
    grid: WindGrid,
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyFetcher {
    pub fn new(grid: WindGrid, failures: usize) -> Self {
        Self {
            grid,
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GridFetcher for FlakyFetcher {
    async fn fetch(&self, key: &ResourceKey) -> Result<WindGrid, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(FetchError::Network(format!("attempt {} for {} failed", call + 1, key)));
        }
        Ok(self.grid.clone())
    }
}

/// Blocks every fetch until [`GatedFetcher::release`] is called.
pub struct GatedFetcher {
    grid: WindGrid,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedFetcher {
    pub fn new(grid: WindGrid) -> Self {
        Self {
            grid,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Let one pending (or the next) fetch complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GridFetcher for GatedFetcher {
    async fn fetch(&self, _key: &ResourceKey) -> Result<WindGrid, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.grid.clone())
    }
}

/// Panics inside the fetch.
#[derive(Default)]
pub struct PanickingFetcher {
    calls: AtomicUsize,
}

impl PanickingFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GridFetcher for PanickingFetcher {
    async fn fetch(&self, key: &ResourceKey) -> Result<WindGrid, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("fetcher exploded for {key}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_quad_grid;
    use forecast_common::{plan_request, select_cycle, WindLevel};

    fn sample_key() -> ResourceKey {
        let now = utc(2024, 1, 15, 13, 0, 0);
        plan_request(now, &select_cycle(now), WindLevel::M10)
            .unwrap()
            .key
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(utc(2024, 1, 1, 0, 0, 0));
        clock.advance(chrono::Duration::hours(2));
        assert_eq!(clock.now(), utc(2024, 1, 1, 2, 0, 0));
        clock.set(utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(clock.now(), utc(2025, 1, 1, 0, 0, 0));
    }

    #[tokio::test]
    async fn test_flaky_fetcher_recovers() {
        let fetcher = FlakyFetcher::new(create_quad_grid(), 1);
        let key = sample_key();
        assert!(fetcher.fetch(&key).await.is_err());
        assert!(fetcher.fetch(&key).await.is_ok());
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_counting_fetcher_records_keys() {
        let fetcher = CountingFetcher::new(create_quad_grid());
        let key = sample_key();
        tokio_test::block_on(fetcher.fetch(&key)).unwrap();
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(fetcher.keys(), vec![key.to_string()]);
    }
}
