//! Vector tile handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::header,
    response::{IntoResponse, Response},
};
use forecast_common::{TileCoord, WindVector};
use vector_tile::{encode_center_point, AttributeValue, TileEncodeError, CONTENT_TYPE};

use super::common::{instant_param, level_param, number_param, record_request};
use crate::error::ApiError;
use crate::state::AppState;

/// Name of the single layer in every tile.
pub const WIND_LAYER: &str = "wind";

/// GET /tiles/gfs/:instant/wind/:level/:x/:y/:zoom
pub async fn tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((instant, level, x, y, zoom)): Path<(String, String, String, String, String)>,
) -> Result<Response, ApiError> {
    record_request("tile");

    let target = instant_param(&instant)?;
    let level = level_param(&level)?;
    let x: u32 = number_param("x", &x)?;
    let y: u32 = number_param("y", &y)?;
    let zoom: u32 = number_param("zoom", &zoom)?;
    let tile = TileCoord::validated(zoom, x, y)?;
    state.service.ensure_not_past(target)?;

    let wind = state
        .service
        .wind_over(target, level, &tile.bounding_box())
        .await?;
    tracing::debug!(tile = %tile, u = wind.u, v = wind.v, "Sampled tile");

    let body = encode_wind_tile(&tile, &wind)?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}

/// One point at the tile center carrying `u`, `v` and `direction`.
pub fn encode_wind_tile(tile: &TileCoord, wind: &WindVector) -> Result<Vec<u8>, TileEncodeError> {
    encode_center_point(
        tile,
        WIND_LAYER,
        vec![
            ("u".to_string(), AttributeValue::Float(wind.u)),
            ("v".to_string(), AttributeValue::Float(wind.v)),
            (
                "direction".to_string(),
                AttributeValue::Double(wind.direction()),
            ),
        ],
    )
}
