//! Error types for forecast planning and sampling.

use thiserror::Error;

/// Result type alias using ForecastError.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Validation errors raised before any upstream work is done.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("Invalid forecast offset: {offset} hours")]
    InvalidForecastOffset { offset: i64 },

    #[error("Coordinate out of range: ({latitude}, {longitude})")]
    OutOfRangeCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid tile: {0}")]
    InvalidTile(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Unsupported level: {0}")]
    UnsupportedLevel(String),
}

impl ForecastError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ForecastError::InvalidForecastOffset { .. }
            | ForecastError::OutOfRangeCoordinate { .. }
            | ForecastError::InvalidTile(_)
            | ForecastError::InvalidTime(_)
            | ForecastError::UnsupportedLevel(_) => 400,

            ForecastError::InvalidGrid(_) => 500,
        }
    }
}
