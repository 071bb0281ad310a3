//! Router-level tests for the AQI API.
//!
//! Requests are driven through the full middleware stack with
//! `tower::ServiceExt::oneshot`; no socket is bound.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use aqi_api::config::ServiceConfig;
use aqi_api::router;
use aqi_api::state::AppState;
use aqi_pipeline::{AirQualityService, PipelineConfig};
use geo_raster::GeoTiffSource;
use super_resolution::Enhancer;
use test_utils::fixtures::grid::DELHI_400;
use test_utils::{create_plume_grid, GeoTiffFixture, OnnxModelFixture};

fn plume_raster() -> (TempDir, PathBuf) {
    GeoTiffFixture::new(DELHI_400)
        .rows_per_strip(32)
        .write_temp_f32(&create_plume_grid(DELHI_400.width, DELHI_400.height))
        .unwrap()
}

/// App with neither raster nor model on disk.
fn synthetic_app() -> Router {
    let config = ServiceConfig::default().with_overrides(
        Some(PathBuf::from("/nonexistent/no2.tif")),
        Some(PathBuf::from("/nonexistent/srcnn.onnx")),
    );
    router(Arc::new(AppState::new(config, None)))
}

/// App backed by a fixture raster and an identity ONNX model.
fn raster_app(path: &PathBuf) -> Router {
    let source = GeoTiffSource::open(path).unwrap();
    let (_model_dir, model_path) = OnnxModelFixture::identity().write_temp().unwrap();
    let enhancer = Enhancer::load(&model_path).unwrap();
    let service = AirQualityService::new(Some(source), Some(enhancer), PipelineConfig::default());
    let config = ServiceConfig::default().with_overrides(Some(path.clone()), None);
    router(Arc::new(AppState::with_service(service, config, None)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// /api/get_air_quality
// ============================================================================

#[tokio::test]
async fn test_default_viewport_without_raster() {
    let body = json!({
        "lat_min": 28.4, "lat_max": 28.9, "lon_min": 76.8, "lon_max": 77.4, "zoom_level": 10
    });
    let response = synthetic_app()
        .oneshot(post_json("/api/get_air_quality", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"].as_array().unwrap().len(), 25);
    assert_eq!(json["metadata"]["real_data"], false);
    assert_eq!(json["metadata"]["zoom_level"], 10.0);
    assert!(json["features"][0]["properties"].get("is_model_data").is_none());
}

#[tokio::test]
async fn test_missing_fields_use_defaults() {
    let response = synthetic_app()
        .oneshot(post_json("/api/get_air_quality", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["features"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn test_non_numeric_field_is_rejected() {
    for body in [
        r#"{"lat_min": "28.4"}"#,
        r#"{"zoom_level": null}"#,
        r#"{"lon_max": false}"#,
        r#"{"lat_min": 28.4,"#,
    ] {
        let response = synthetic_app()
            .oneshot(post_json("/api/get_air_quality", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid bounds parameters");
    }
}

#[tokio::test]
async fn test_raster_at_close_zoom_uses_model() {
    let (_dir, path) = plume_raster();
    let body = json!({
        "lat_min": 28.62, "lat_max": 28.63, "lon_min": 77.21, "lon_max": 77.22, "zoom_level": 14
    });
    let response = raster_app(&path)
        .oneshot(post_json("/api/get_air_quality", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["metadata"]["real_data"], true);
    assert_eq!(json["metadata"]["used_model"], true);
    let features = json["features"].as_array().unwrap();
    assert!(!features.is_empty());
    for feature in features {
        let aqi = feature["properties"]["aqi"].as_u64().unwrap();
        assert!(aqi <= 500);
        assert_eq!(feature["properties"]["is_model_data"], true);
    }
}

#[tokio::test]
async fn test_raster_at_city_zoom_is_raw() {
    let (_dir, path) = plume_raster();
    let body = json!({
        "lat_min": 28.4, "lat_max": 28.8, "lon_min": 77.0, "lon_max": 77.4, "zoom_level": 10
    });
    let response = raster_app(&path)
        .oneshot(post_json("/api/get_air_quality", &body.to_string()))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["metadata"]["real_data"], true);
    assert_eq!(json["metadata"]["used_model"], false);
}

#[tokio::test]
async fn test_request_outside_raster_gets_synthetic_grid() {
    let (_dir, path) = plume_raster();
    let body = json!({
        "lat_min": 18.9, "lat_max": 19.0, "lon_min": 72.8, "lon_max": 72.9, "zoom_level": 12
    });
    let response = raster_app(&path)
        .oneshot(post_json("/api/get_air_quality", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["metadata"]["real_data"], false);
    assert_eq!(json["metadata"]["fallback_reason"], "degenerate_window");
    assert_eq!(json["features"].as_array().unwrap().len(), 36);
}

// ============================================================================
// Other endpoints
// ============================================================================

#[tokio::test]
async fn test_forecast() {
    let response = synthetic_app()
        .oneshot(post_json("/api/get_forecast", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let forecast = json["forecast"].as_array().unwrap();
    assert_eq!(forecast.len(), 3);
    assert_eq!(forecast[0], json!({"day": "Today", "aqi": 120, "color": "#FF7E00"}));
    assert_eq!(forecast[1]["color"], "#FF7E00");
    assert_eq!(forecast[2]["color"], "#FF0000");
}

#[tokio::test]
async fn test_test_endpoint() {
    let response = synthetic_app().oneshot(get("/api/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "message": "Server is running"})
    );
}

#[tokio::test]
async fn test_model_status_without_files() {
    let response = synthetic_app().oneshot(get("/api/model_status")).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json["model_loaded"], false);
    assert_eq!(json["geotiff_exists"], false);
    assert_eq!(json["geotiff_path"], "/nonexistent/no2.tif");
    assert!(json.get("raster").is_none());
}

#[tokio::test]
async fn test_model_status_with_raster() {
    let (_dir, path) = plume_raster();
    let response = raster_app(&path).oneshot(get("/api/model_status")).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json["model_loaded"], true);
    assert_eq!(json["geotiff_exists"], true);
    assert_eq!(json["raster"]["width"], 400);
    assert_eq!(json["raster"]["height"], 400);
    assert_eq!(json["raster"]["georeferenced"], true);
    assert!(json["raster"]["bounds"]["west"].as_f64().is_some());
}

#[tokio::test]
async fn test_aqi_scale() {
    let response = synthetic_app().oneshot(get("/api/aqi_scale")).await.unwrap();
    let json = body_json(response).await;
    let scale = json.as_array().unwrap();

    assert_eq!(scale.len(), 6);
    assert_eq!(scale[0]["category"], "good");
    assert_eq!(scale[0]["color"], "#00E400");
    assert_eq!(scale[2]["label"], "Unhealthy for Sensitive Groups");
    assert_eq!(scale[5]["max"], 500);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = synthetic_app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"status": "ok"}));

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/api/test")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = synthetic_app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let response = synthetic_app().oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
