//! Point lookup handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use forecast_common::GeoPoint;
use serde::{Deserialize, Serialize};

use super::common::{instant_param, level_param, number_param, record_request};
use crate::error::ApiError;
use crate::state::AppState;

/// Wind components in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindResponse {
    pub u: f32,
    pub v: f32,
}

/// GET /position/gfs/:instant/wind/:level/:lat/:lon
pub async fn position_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((instant, level, lat, lon)): Path<(String, String, String, String)>,
) -> Result<Json<WindResponse>, ApiError> {
    record_request("position");

    let target = instant_param(&instant)?;
    let level = level_param(&level)?;
    let point = GeoPoint::new(number_param("latitude", &lat)?, number_param("longitude", &lon)?);
    state.service.ensure_not_past(target)?;

    let wind = state.service.wind_at(target, level, &point).await?;
    Ok(Json(WindResponse {
        u: wind.u,
        v: wind.v,
    }))
}
