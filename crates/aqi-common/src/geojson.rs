//! GeoJSON response types for AQI point features.
//!
//! Responses are a `FeatureCollection` of `Point` features with AQI
//! properties, plus a `metadata` member describing where the values came
//! from (real raster data, super-resolved data or the synthetic fallback).

use serde::{Deserialize, Serialize};

use crate::aqi::AqiCategory;

/// A GeoJSON FeatureCollection of AQI points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<AqiFeature>,

    pub metadata: ResponseMetadata,
}

impl FeatureCollection {
    pub fn new(features: Vec<AqiFeature>, metadata: ResponseMetadata) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features,
            metadata,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A single AQI point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AqiFeature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    pub properties: AqiProperties,

    pub geometry: PointGeometry,
}

impl AqiFeature {
    /// Create a feature whose color is derived from its AQI value.
    pub fn new(lon: f64, lat: f64, aqi: u16) -> Self {
        Self {
            type_: "Feature".to_string(),
            properties: AqiProperties {
                aqi,
                color: AqiCategory::from_aqi(aqi).color().to_string(),
                is_model_data: None,
            },
            geometry: PointGeometry::new(lon, lat),
        }
    }

    /// Mark the feature as derived from the raster (`is_model_data: true`).
    pub fn with_model_data(mut self) -> Self {
        self.properties.is_model_data = Some(true);
        self
    }

    pub fn lon(&self) -> f64 {
        self.geometry.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.geometry.coordinates[1]
    }
}

/// Feature properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AqiProperties {
    /// AQI index, 0..=500.
    pub aqi: u16,

    /// Palette color for `aqi`, e.g. "#FF7E00".
    pub color: String,

    /// Present (and true) only on features sampled from the raster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_model_data: Option<bool>,
}

/// GeoJSON Point geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointGeometry {
    /// Type identifier (always "Point").
    #[serde(rename = "type")]
    pub type_: String,

    /// Coordinates as [longitude, latitude].
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            type_: "Point".to_string(),
            coordinates: [lon, lat],
        }
    }
}

/// Provenance of a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResponseMetadata {
    pub zoom_level: f64,

    /// True when features were sampled from the raster.
    pub real_data: bool,

    /// True when the super-resolution pass was applied. Only reported for
    /// real-data responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_model: Option<bool>,

    /// Set on the hardcoded single-point response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_emergency_fallback: Option<bool>,

    /// Why real data could not be served, e.g. "raster_unavailable".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl ResponseMetadata {
    /// Metadata for features sampled from the raster.
    pub fn real(zoom_level: f64, used_model: bool) -> Self {
        Self {
            zoom_level,
            real_data: true,
            used_model: Some(used_model),
            ..Default::default()
        }
    }

    /// Metadata for the synthetic grid.
    pub fn synthetic(zoom_level: f64, reason: impl Into<String>) -> Self {
        Self {
            zoom_level,
            real_data: false,
            fallback_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Metadata for the hardcoded last-resort point.
    pub fn emergency(zoom_level: f64, reason: impl Into<String>) -> Self {
        Self {
            zoom_level,
            real_data: false,
            is_emergency_fallback: Some(true),
            fallback_reason: Some(reason.into()),
            ..Default::default()
        }
    }
}
