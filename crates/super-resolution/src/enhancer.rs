//! Tile enhancement and the policy deciding when to apply it.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use aqi_common::AirQualityRequest;
use geo_raster::RasterTile;

use crate::error::{EnhanceError, Result};
use crate::model::SrcnnModel;

/// Outcome of the super-resolution gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Apply,
    ZoomTooLow,
    AreaTooLarge,
    ModelNotLoaded,
}

impl GateDecision {
    pub fn applies(&self) -> bool {
        matches!(self, Self::Apply)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apply => "applied",
            Self::ZoomTooLow => "zoom_too_low",
            Self::AreaTooLarge => "area_too_large",
            Self::ModelNotLoaded => "model_not_loaded",
        }
    }
}

/// When to run the network: close zoom over a small area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperResolutionGate {
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Largest latitude or longitude span, in degrees, that is enhanced.
    #[serde(default = "default_max_span")]
    pub max_span_degrees: f64,
}

fn default_min_zoom() -> f64 {
    12.0
}

fn default_max_span() -> f64 {
    2.0
}

impl Default for SuperResolutionGate {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_span_degrees: default_max_span(),
        }
    }
}

impl SuperResolutionGate {
    pub fn decide(&self, request: &AirQualityRequest, model_loaded: bool) -> GateDecision {
        if request.zoom_level < self.min_zoom {
            GateDecision::ZoomTooLow
        } else if request.lat_span() > self.max_span_degrees
            || request.lon_span() > self.max_span_degrees
        {
            GateDecision::AreaTooLarge
        } else if !model_loaded {
            GateDecision::ModelNotLoaded
        } else {
            GateDecision::Apply
        }
    }
}

/// Runs the SRCNN over raster tiles in the tile's own value range.
#[derive(Debug)]
pub struct Enhancer {
    model: SrcnnModel,
}

impl Enhancer {
    pub fn new(model: SrcnnModel) -> Self {
        Self { model }
    }

    /// Load an ONNX model file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        SrcnnModel::load(path).map(Self::new)
    }

    pub fn model(&self) -> &SrcnnModel {
        &self.model
    }

    /// Enhance a tile, returning values for every pixel in tile order.
    ///
    /// Values are normalized to [0, 1] with the tile's NaN-aware min and
    /// max, NaN becomes 0, and the network output is scaled back. A constant
    /// tile comes back unchanged.
    pub fn enhance(&self, tile: &RasterTile) -> Result<Vec<f32>> {
        let (min, max) = tile.value_range().ok_or(EnhanceError::EmptyInput)?;
        if min == max {
            return Ok(vec![min; tile.data.len()]);
        }

        let started = Instant::now();
        let span = max - min;
        let normalized: Vec<f32> = tile
            .data
            .iter()
            .map(|&v| if v.is_nan() { 0.0 } else { (v - min) / span })
            .collect();

        let output = self.model.predict(tile.rows, tile.cols, normalized)?;
        if output.iter().any(|v| !v.is_finite()) {
            return Err(EnhanceError::NonFiniteOutput);
        }

        debug!(
            rows = tile.rows,
            cols = tile.cols,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Enhanced tile"
        );

        Ok(output.into_iter().map(|v| v * span + min).collect())
    }
}
