//! Cache implementations for forecast grids.

mod grid_cache;

pub use grid_cache::ForecastGridCache;
