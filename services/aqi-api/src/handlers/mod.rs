//! HTTP request handlers for the AQI API.

pub mod air_quality;
pub mod health;
pub mod status;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

use aqi_common::AqiError;

/// JSON error body `{"error": "..."}` with the status the error maps to.
pub fn error_response(err: &AqiError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.client_message() }))).into_response()
}
