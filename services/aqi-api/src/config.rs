//! Service configuration loading and types.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use aqi_common::AirQualityRequest;
use aqi_pipeline::PipelineConfig;

/// Service configuration loaded from a YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Single-band NO2 GeoTIFF.
    #[serde(default = "default_raster_path")]
    pub raster_path: PathBuf,

    /// SRCNN model exported to ONNX.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Default bounds, value range and super-resolution gate.
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    /// Values used for request fields the client leaves out.
    #[serde(default)]
    pub request_defaults: AirQualityRequest,
}

fn default_raster_path() -> PathBuf {
    PathBuf::from("data/Delhi_NO2_Jan2023.tif")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/srcnn.onnx")
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            raster_path: default_raster_path(),
            model_path: default_model_path(),
            pipeline: PipelineConfig::default(),
            request_defaults: AirQualityRequest::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            path = %path.display(),
            raster = %config.raster_path.display(),
            model = %config.model_path.display(),
            "Loaded service config"
        );
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line path overrides.
    pub fn with_overrides(mut self, raster_path: Option<PathBuf>, model_path: Option<PathBuf>) -> Self {
        if let Some(path) = raster_path {
            self.raster_path = path;
        }
        if let Some(path) = model_path {
            self.model_path = path;
        }
        self
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        self.pipeline
    }

    fn validate(&self) -> Result<()> {
        let bounds = &self.pipeline.default_bounds;
        if !bounds.is_valid() {
            bail!(
                "default_bounds must be finite with west < east and south < north, got {:?}",
                bounds
            );
        }

        let range = &self.pipeline.value_range;
        if !(range.min.is_finite() && range.max.is_finite() && range.max > range.min) {
            bail!("value_range must satisfy min < max, got {:?}", range);
        }

        if !self.request_defaults.is_finite() {
            bail!("request_defaults must be finite numbers");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_common::DEFAULT_BOUNDS;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ServiceConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.pipeline.default_bounds, DEFAULT_BOUNDS);
        assert_eq!(config.pipeline.super_resolution.min_zoom, 12.0);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = ServiceConfig::from_yaml(include_str!("../../../config/aqi.yaml")).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let yaml = r#"
raster_path: /srv/no2.tif
super_resolution:
  min_zoom: 13.0
request_defaults:
  lat_min: 18.9
  lat_max: 19.0
  lon_min: 72.8
  lon_max: 72.9
  zoom_level: 12.0
"#;
        let config = ServiceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.raster_path, PathBuf::from("/srv/no2.tif"));
        assert_eq!(config.model_path, default_model_path());
        assert_eq!(config.pipeline.super_resolution.min_zoom, 13.0);
        assert_eq!(config.pipeline.super_resolution.max_span_degrees, 2.0);
        assert_eq!(config.request_defaults.zoom_level, 12.0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let yaml = "default_bounds: { west: 77.4, south: 28.4, east: 77.0, north: 28.8 }";
        assert!(ServiceConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_value_range_rejected() {
        let yaml = "value_range: { min: 10.0, max: 10.0 }";
        assert!(ServiceConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        assert!(ServiceConfig::from_yaml("raster_path: [unterminated").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServiceConfig::load(Path::new("/nonexistent/aqi.yaml")).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aqi.yaml");
        std::fs::write(&path, "model_path: srcnn_x4.onnx\n").unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.model_path, PathBuf::from("srcnn_x4.onnx"));
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::default()
            .with_overrides(Some(PathBuf::from("a.tif")), None);
        assert_eq!(config.raster_path, PathBuf::from("a.tif"));
        assert_eq!(config.model_path, default_model_path());
    }
}
