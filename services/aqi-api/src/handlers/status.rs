//! Service status and legend handlers.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use aqi_common::{AqiCategory, GeoBounds};

use crate::state::AppState;

#[derive(Serialize)]
pub struct TestResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ModelStatusResponse {
    pub model_loaded: bool,
    pub geotiff_exists: bool,
    pub model_path: String,
    pub geotiff_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raster: Option<RasterStatus>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RasterStatus {
    pub width: usize,
    pub height: usize,
    pub georeferenced: bool,
    /// Geographic extent, when the file carries georeferencing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GeoBounds>,
}

#[derive(Debug, Serialize)]
pub struct ScaleEntry {
    pub category: AqiCategory,
    pub label: &'static str,
    pub min: u16,
    pub max: u16,
    pub color: &'static str,
    pub advisory: &'static str,
}

/// GET /api/test
pub async fn test_handler() -> Json<TestResponse> {
    Json(TestResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// GET /api/model_status
#[instrument(skip(state))]
pub async fn model_status_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ModelStatusResponse> {
    let raster = state.service.raster().map(|source| RasterStatus {
        width: source.width(),
        height: source.height(),
        georeferenced: state.service.mapper().transform().is_some(),
        bounds: state.service.mapper().bounds().copied(),
    });

    Json(ModelStatusResponse {
        model_loaded: state.service.model_loaded(),
        geotiff_exists: state.config.raster_path.exists(),
        model_path: state.config.model_path.display().to_string(),
        geotiff_path: state.config.raster_path.display().to_string(),
        raster,
        started_at: state.started_at,
    })
}

/// GET /api/aqi_scale
pub async fn aqi_scale_handler() -> Json<Vec<ScaleEntry>> {
    let scale = AqiCategory::ALL
        .iter()
        .map(|category| {
            let (min, max) = category.range();
            ScaleEntry {
                category: *category,
                label: category.label(),
                min,
                max,
                color: category.color(),
                advisory: category.advisory(),
            }
        })
        .collect();
    Json(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_test_handler() {
        let Json(response) = test_handler().await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.message, "Server is running");
    }

    #[tokio::test]
    async fn test_scale_is_contiguous() {
        let Json(scale) = aqi_scale_handler().await;
        assert_eq!(scale.len(), 6);
        assert_eq!(scale[0].min, 0);
        assert_eq!(scale[5].color, "#7E0023");
        for pair in scale.windows(2) {
            assert_eq!(pair[0].max + 1, pair[1].min);
        }
    }
}
