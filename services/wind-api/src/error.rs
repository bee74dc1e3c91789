//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forecast_common::ForecastError;
use grid_processor::GridProcessorError;
use serde::Serialize;
use thiserror::Error;
use vector_tile::TileEncodeError;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed path parameter.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] GridProcessorError),

    #[error("tile encoding failed: {0}")]
    Encode(#[from] TileEncodeError),
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError::Service(err.into())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients. Server-side detail stays in the logs.
    fn public_message(&self, status: StatusCode) -> String {
        match status {
            StatusCode::BAD_GATEWAY => "Forecast data is temporarily unavailable".to_string(),
            s if s.is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            status_code: status.as_u16(),
            message: self.public_message(status),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_common::FetchError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ForecastError::InvalidForecastOffset { offset: 121 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Service(FetchError::Network("refused".into()).into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Encode(TileEncodeError::EmptyLayerName).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_detail_is_hidden() {
        let err = ApiError::Service(FetchError::Decode("bad section 7 at 0x1f".into()).into());
        let message = err.public_message(err.status());
        assert!(!message.contains("0x1f"));
    }

    #[test]
    fn test_client_errors_keep_detail() {
        let err = ApiError::from(ForecastError::UnsupportedLevel("850mb".into()));
        assert!(err.public_message(err.status()).contains("850mb"));
    }
}
