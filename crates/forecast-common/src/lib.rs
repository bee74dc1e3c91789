//! Common types and utilities shared across the wind forecast crates.
//!
//! Everything in here is pure data and math: tile geometry, forecast cycle
//! selection, request planning and the grid/vector types. The one seam that
//! reaches the outside world, [`GridFetcher`], is only declared here so the
//! cache, the GFS client and the test fixtures can all agree on it.

pub mod bbox;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod grid;
pub mod tile;
pub mod time;

pub use bbox::{BoundingBox, GeoPoint};
pub use error::{ForecastError, ForecastResult};
pub use fetch::{FetchError, GridFetcher};
pub use forecast::{plan_request, ForecastOffset, ForecastRequest, ResourceKey, WindLevel};
pub use grid::{GridSpec, WindGrid, WindVector};
pub use tile::TileCoord;
pub use time::{
    parse_instant, select_cycle, start_of_hour, Clock, CycleHour, ForecastCycle, SystemClock,
};
