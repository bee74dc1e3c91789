//! Error types for grid lookup and sampling.

use forecast_common::{FetchError, ForecastError};
use thiserror::Error;

/// Errors that can occur while resolving a wind value.
#[derive(Error, Debug, Clone)]
pub enum GridProcessorError {
    /// The request was rejected before any upstream work.
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// The upstream grid could not be downloaded or decoded.
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] FetchError),
}

impl GridProcessorError {
    /// HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Forecast(err) => err.http_status_code(),
            Self::Upstream(_) => 502,
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
