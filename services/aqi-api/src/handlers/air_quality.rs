//! Air quality and forecast handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use aqi_common::{static_forecast, AirQualityRequest, AqiResult, ForecastResponse};
use aqi_pipeline::emergency_collection;

use super::error_response;
use crate::metrics;
use crate::state::AppState;

/// Parse a request body. An empty body means "all defaults".
pub fn parse_request(body: &[u8], defaults: &AirQualityRequest) -> AqiResult<AirQualityRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(*defaults);
    }
    let value: Value = serde_json::from_slice(body)?;
    AirQualityRequest::from_json_value(&value, defaults)
}

/// POST /api/get_air_quality
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn get_air_quality_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let request = match parse_request(&body, &state.config.request_defaults) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected air quality request");
            metrics::record_invalid_request();
            return error_response(&e);
        }
    };

    // Raster decoding and the SRCNN forward pass are CPU-bound.
    let worker_state = Arc::clone(&state);
    let report = match tokio::task::spawn_blocking(move || {
        worker_state.service.get_air_quality(&request)
    })
    .await
    {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Air quality task failed");
            return Json(emergency_collection(request.zoom_level, "task_failed")).into_response();
        }
    };

    metrics::record_report(&report, started.elapsed());
    debug!(
        tier = report.tier.as_str(),
        enhancement = report.enhancement.as_str(),
        features = report.collection.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Served air quality request"
    );

    Json(report.collection).into_response()
}

/// POST /api/get_forecast
pub async fn get_forecast_handler() -> Json<ForecastResponse> {
    Json(static_forecast())
}
