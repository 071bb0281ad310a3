//! AQI API Service Library
//!
//! HTTP surface for the AQI map: point features for a viewport, the
//! forecast stub, model status and the AQI legend.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Map data
        .route(
            "/api/get_air_quality",
            post(handlers::air_quality::get_air_quality_handler),
        )
        .route(
            "/api/get_forecast",
            post(handlers::air_quality::get_forecast_handler),
        )
        // Status
        .route("/api/test", get(handlers::status::test_handler))
        .route(
            "/api/model_status",
            get(handlers::status::model_status_handler),
        )
        .route("/api/aqi_scale", get(handlers::status::aqi_scale_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
