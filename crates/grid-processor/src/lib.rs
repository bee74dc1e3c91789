//! Forecast grid acquisition, caching and spatial sampling.
//!
//! This crate owns the only mutable shared state of the wind service: a
//! process-local cache of decoded GFS wind grids. It enables:
//!
//! - **Single-flight fetches**: concurrent requests for the same grid share
//!   one download
//! - **Validity-bound caching**: each grid lives until one hour past the
//!   instant it describes
//! - **Pluggable sampling**: inverse-distance or bicubic point lookup, cell
//!   means for areas
//!
//! # Architecture
//!
//! ```text
//! Wind request (instant, point or bbox)
//!      │
//!      ▼
//! WindForecastService
//!      │
//!      ├─► select_cycle(now) ─► plan_request ─► ResourceKey + expiration
//!      │
//!      ├─► ForecastGridCache::get_or_fetch
//!      │         │
//!      │         ├─► Live entry: return shared grid
//!      │         │
//!      │         ├─► Fetch in flight: wait on the shared handle
//!      │         │
//!      │         └─► Miss: spawn fetch task ─► GridFetcher
//!      │
//!      └─► GridSampler (point or area)
//!               │
//!               ▼
//!          WindVector
//! ```

pub mod cache;
pub mod error;
pub mod sampling;
pub mod service;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::ForecastGridCache;
pub use error::{GridProcessorError, Result};
pub use sampling::{
    area_mean, Bicubic, CellBlock, GridSampler, InverseDistance, SamplingMethod,
    SamplingStrategy,
};
pub use service::WindForecastService;
pub use types::CacheStats;
