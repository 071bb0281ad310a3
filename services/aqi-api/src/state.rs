//! Application state for the AQI API.

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use aqi_pipeline::AirQualityService;

use crate::config::ServiceConfig;

/// Shared application state. Built once in `main`, read-only afterwards.
pub struct AppState {
    /// Raster, model and fallback pipeline.
    pub service: AirQualityService,

    pub config: ServiceConfig,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,

    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Load the raster and model named in `config`. Missing files leave the
    /// service running on synthetic data.
    pub fn new(config: ServiceConfig, prometheus: Option<PrometheusHandle>) -> Self {
        let service = AirQualityService::open(
            &config.raster_path,
            &config.model_path,
            config.pipeline_config(),
        );
        Self::with_service(service, config, prometheus)
    }

    /// Wrap an already-built service.
    pub fn with_service(
        service: AirQualityService,
        config: ServiceConfig,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            service,
            config,
            prometheus,
            started_at: Utc::now(),
        }
    }
}
