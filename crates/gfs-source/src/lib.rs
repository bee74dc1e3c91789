//! GFS 0.25° 10 m wind source.
//!
//! [`GfsGridFetcher`] implements [`forecast_common::GridFetcher`]: it renders
//! the upstream URL for a resource key, downloads the filtered GRIB2 file from
//! NOMADS and decodes the UGRD/VGRD pair into a [`forecast_common::WindGrid`].

pub mod client;
pub mod decode;
pub mod url;

pub use client::{FetchConfig, GfsGridFetcher};
pub use decode::decode_wind_grid;
pub use url::{UrlTemplate, DEFAULT_GFS_URL_TEMPLATE};
