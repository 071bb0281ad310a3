//! Geographic bounds and the air-quality request box.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AqiError;

/// Fallback region (Delhi) used when no georeferencing is available.
pub const DEFAULT_BOUNDS: GeoBounds = GeoBounds {
    west: 77.0,
    south: 28.4,
    east: 77.4,
    north: 28.8,
};

/// A WGS84 rectangle in degrees, stored as (west, south, east, north).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Create bounds from edge coordinates.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Longitude extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Bounds usable as an interpolation frame: finite with positive extent.
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }

    /// Check if a point is contained within these bounds (edges inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Clamp a point into these bounds.
    pub fn clamp_point(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            lon.max(self.west).min(self.east),
            lat.max(self.south).min(self.north),
        )
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        DEFAULT_BOUNDS
    }
}

/// A map viewport for which AQI points are requested.
///
/// `lat_min <= lat_max` and `lon_min <= lon_max` are expected but not
/// enforced; downstream code tolerates inverted boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityRequest {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub zoom_level: f64,
}

impl Default for AirQualityRequest {
    /// The Delhi viewport the web client opens with.
    fn default() -> Self {
        Self {
            lat_min: 28.4,
            lat_max: 28.9,
            lon_min: 76.8,
            lon_max: 77.4,
            zoom_level: 10.0,
        }
    }
}

impl AirQualityRequest {
    const FIELDS: [&'static str; 5] = ["lat_min", "lat_max", "lon_min", "lon_max", "zoom_level"];

    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64, zoom_level: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            zoom_level,
        }
    }

    /// Build a request from a JSON body, filling absent fields from `defaults`.
    ///
    /// Every field that is present must be a JSON number; strings, booleans,
    /// nulls and nested values are rejected.
    pub fn from_json_value(body: &Value, defaults: &AirQualityRequest) -> Result<Self, AqiError> {
        let object = body.as_object().ok_or_else(|| {
            AqiError::InvalidRequest("request body must be a JSON object".to_string())
        })?;

        let mut values = [
            defaults.lat_min,
            defaults.lat_max,
            defaults.lon_min,
            defaults.lon_max,
            defaults.zoom_level,
        ];

        for (slot, name) in values.iter_mut().zip(Self::FIELDS) {
            if let Some(raw) = object.get(name) {
                *slot = raw.as_f64().ok_or_else(|| AqiError::InvalidParameter {
                    param: name.to_string(),
                    message: format!("expected a number, got {}", raw),
                })?;
            }
        }

        let [lat_min, lat_max, lon_min, lon_max, zoom_level] = values;
        Ok(Self::new(lat_min, lat_max, lon_min, lon_max, zoom_level))
    }

    /// Absolute latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        (self.lat_max - self.lat_min).abs()
    }

    /// Absolute longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        (self.lon_max - self.lon_min).abs()
    }

    /// True when every coordinate and the zoom level are finite.
    pub fn is_finite(&self) -> bool {
        [
            self.lat_min,
            self.lat_max,
            self.lon_min,
            self.lon_max,
            self.zoom_level,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
