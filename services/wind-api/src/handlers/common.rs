//! Path parameter parsing shared by the wind endpoints.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use forecast_common::{parse_instant, WindLevel};

use crate::error::ApiError;

/// Parse the `{instant}` segment.
pub fn instant_param(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    Ok(parse_instant(raw)?)
}

/// Parse the `{level}` segment.
pub fn level_param(raw: &str) -> Result<WindLevel, ApiError> {
    Ok(raw.parse::<WindLevel>()?)
}

/// Parse a numeric segment, naming it in the error.
pub fn number_param<T: FromStr>(name: &str, raw: &str) -> Result<T, ApiError> {
    raw.parse::<T>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {name}: {raw}")))
}

pub fn record_request(endpoint: &'static str) {
    metrics::counter!("wind_requests_total", "endpoint" => endpoint).increment(1);
}
