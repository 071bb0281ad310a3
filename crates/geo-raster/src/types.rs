//! Core raster types.

use serde::{Deserialize, Serialize};

use aqi_common::GeoBounds;

use crate::transform::GeoTransform;

/// A rectangular pixel region, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWindow {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl PixelWindow {
    pub fn new(row_min: usize, row_max: usize, col_min: usize, col_max: usize) -> Self {
        Self {
            row_min,
            row_max,
            col_min,
            col_max,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_max.saturating_sub(self.row_min)
    }

    pub fn cols(&self) -> usize {
        self.col_max.saturating_sub(self.col_min)
    }

    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One band of pixel data read through a window. Row-major, `NaN` marks
/// invalid samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    pub data: Vec<f32>,
    pub rows: usize,
    pub cols: usize,
    pub window: PixelWindow,
}

impl RasterTile {
    pub fn new(data: Vec<f32>, window: PixelWindow) -> Self {
        Self {
            rows: window.rows(),
            cols: window.cols(),
            data,
            window,
        }
    }

    /// Value at a tile-local position.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Number of non-NaN samples.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Minimum and maximum over valid samples, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Raster facts read once when the service starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    pub width: usize,
    pub height: usize,
    pub transform: Option<GeoTransform>,
    pub bounds: Option<GeoBounds>,
    pub nodata: Option<f64>,
}
