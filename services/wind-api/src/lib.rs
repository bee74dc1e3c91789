//! Wind API service library.
//!
//! HTTP boundary for the GFS wind forecast engine: vector tiles and point
//! lookups, plus health, cache statistics and Prometheus metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod sweeper;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Wind endpoints
        .route(
            "/tiles/gfs/:instant/wind/:level/:x/:y/:zoom",
            get(handlers::tiles::tile_handler),
        )
        .route(
            "/position/gfs/:instant/wind/:level/:lat/:lon",
            get(handlers::position::position_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/api/cache/stats", get(handlers::health::cache_stats_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
