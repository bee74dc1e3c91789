//! High-level wind lookup service.
//!
//! `WindForecastService` ties the pieces together for one request:
//!
//! ```text
//! Clock ─► select_cycle ─► plan_request ─► ForecastGridCache ─► GridSampler
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let service = WindForecastService::new(cache, fetcher, GridSampler::default(), clock);
//! let wind = service
//!     .wind_at(target, WindLevel::M10, &GeoPoint::new(51.5, -0.12))
//!     .await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use forecast_common::{
    plan_request, select_cycle, start_of_hour, BoundingBox, Clock, ForecastError,
    ForecastRequest, GeoPoint, GridFetcher, WindGrid, WindLevel, WindVector,
};
use tracing::debug;

use crate::cache::ForecastGridCache;
use crate::error::Result;
use crate::sampling::{check_point, GridSampler};

/// Resolves wind vectors for points and boxes at a target instant.
pub struct WindForecastService {
    cache: ForecastGridCache,
    fetcher: Arc<dyn GridFetcher>,
    sampler: GridSampler,
    clock: Arc<dyn Clock>,
}

impl WindForecastService {
    pub fn new(
        cache: ForecastGridCache,
        fetcher: Arc<dyn GridFetcher>,
        sampler: GridSampler,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            sampler,
            clock,
        }
    }

    pub fn cache(&self) -> &ForecastGridCache {
        &self.cache
    }

    pub fn sampler(&self) -> &GridSampler {
        &self.sampler
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Reject targets earlier than the start of the current hour.
    pub fn ensure_not_past(&self, target: DateTime<Utc>) -> Result<()> {
        let floor = start_of_hour(self.clock.now());
        if target < floor {
            return Err(ForecastError::InvalidTime(format!(
                "{} is before {}",
                target.to_rfc3339(),
                floor.to_rfc3339()
            ))
            .into());
        }
        Ok(())
    }

    /// Plan the grid lookup for `target` against the newest published run.
    pub fn plan(&self, target: DateTime<Utc>, level: WindLevel) -> Result<ForecastRequest> {
        let cycle = select_cycle(self.clock.now());
        let request = plan_request(target, &cycle, level)?;
        debug!(
            cycle = %cycle,
            key = %request.key,
            expires_at = %request.expiration,
            "Planned forecast request"
        );
        Ok(request)
    }

    /// Fetch (or reuse) the grid that covers `target`.
    pub async fn grid_for(
        &self,
        target: DateTime<Utc>,
        level: WindLevel,
    ) -> Result<(ForecastRequest, Arc<WindGrid>)> {
        let request = self.plan(target, level)?;
        let grid = self
            .cache
            .get_or_fetch(&request.key, request.expiration, Arc::clone(&self.fetcher))
            .await?;
        Ok((request, grid))
    }

    /// Interpolated wind at a single point.
    pub async fn wind_at(
        &self,
        target: DateTime<Utc>,
        level: WindLevel,
        point: &GeoPoint,
    ) -> Result<WindVector> {
        check_point(point)?;
        let (_, grid) = self.grid_for(target, level).await?;
        Ok(self.sampler.sample_point(&grid, point)?)
    }

    /// Aggregate wind over a bounding box.
    pub async fn wind_over(
        &self,
        target: DateTime<Utc>,
        level: WindLevel,
        bbox: &BoundingBox,
    ) -> Result<WindVector> {
        check_point(&bbox.north_west)?;
        check_point(&bbox.south_east)?;
        check_point(&bbox.center)?;
        let (_, grid) = self.grid_for(target, level).await?;
        Ok(self.sampler.sample_area(&grid, bbox)?)
    }
}
