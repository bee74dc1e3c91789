//! Turning geographic points and boxes into wind vectors.
//!
//! Strategies plug in behind [`SamplingStrategy`]; [`GridSampler`] wraps one
//! and rejects non-finite coordinates before any grid math runs.

pub mod area;
pub mod interpolation;

use std::str::FromStr;
use std::sync::Arc;

use forecast_common::{BoundingBox, ForecastError, ForecastResult, GeoPoint, WindGrid, WindVector};
use serde::{Deserialize, Serialize};

pub use area::{area_mean, CellBlock};

/// A way of sampling a wind grid.
pub trait SamplingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Interpolate the vector at a single point.
    fn sample_point(&self, grid: &WindGrid, point: &GeoPoint) -> WindVector;

    /// Aggregate the vector over a box.
    ///
    /// Defaults to the mean of the covered cells, falling back to
    /// [`sample_point`](Self::sample_point) at the box center for small boxes.
    fn sample_area(&self, grid: &WindGrid, bbox: &BoundingBox) -> WindVector {
        area_mean(grid, bbox).unwrap_or_else(|| self.sample_point(grid, &bbox.center))
    }
}

/// Inverse-distance weighting over the nearest four cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseDistance;

impl SamplingStrategy for InverseDistance {
    fn name(&self) -> &'static str {
        "idw"
    }

    fn sample_point(&self, grid: &WindGrid, point: &GeoPoint) -> WindVector {
        let (row, col) = grid.spec().fractional_position(point);
        interpolation::inverse_distance(grid, row, col)
    }
}

/// Catmull-Rom bicubic interpolation over the nearest sixteen cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bicubic;

impl SamplingStrategy for Bicubic {
    fn name(&self) -> &'static str {
        "bicubic"
    }

    fn sample_point(&self, grid: &WindGrid, point: &GeoPoint) -> WindVector {
        let (row, col) = grid.spec().fractional_position(point);
        interpolation::catmull_rom(grid, row, col)
    }
}

/// Configurable choice of sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    #[default]
    InverseDistance,
    Bicubic,
}

impl SamplingMethod {
    pub fn strategy(&self) -> Arc<dyn SamplingStrategy> {
        match self {
            SamplingMethod::InverseDistance => Arc::new(InverseDistance),
            SamplingMethod::Bicubic => Arc::new(Bicubic),
        }
    }
}

impl FromStr for SamplingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "idw" | "inverse_distance" | "inverse-distance" => Ok(SamplingMethod::InverseDistance),
            "bicubic" | "cubic" => Ok(SamplingMethod::Bicubic),
            other => Err(format!("unknown sampling method: {other}")),
        }
    }
}

/// Samples grids with a chosen strategy, validating coordinates first.
#[derive(Clone)]
pub struct GridSampler {
    strategy: Arc<dyn SamplingStrategy>,
}

impl GridSampler {
    pub fn new(method: SamplingMethod) -> Self {
        Self::with_strategy(method.strategy())
    }

    pub fn with_strategy(strategy: Arc<dyn SamplingStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn sample_point(&self, grid: &WindGrid, point: &GeoPoint) -> ForecastResult<WindVector> {
        check_point(point)?;
        Ok(self.strategy.sample_point(grid, point))
    }

    pub fn sample_area(&self, grid: &WindGrid, bbox: &BoundingBox) -> ForecastResult<WindVector> {
        check_point(&bbox.north_west)?;
        check_point(&bbox.south_east)?;
        check_point(&bbox.center)?;
        Ok(self.strategy.sample_area(grid, bbox))
    }
}

impl Default for GridSampler {
    fn default() -> Self {
        Self::new(SamplingMethod::default())
    }
}

impl std::fmt::Debug for GridSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSampler")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

/// Reject NaN and infinite coordinates.
pub fn check_point(point: &GeoPoint) -> ForecastResult<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(ForecastError::OutOfRangeCoordinate {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}
