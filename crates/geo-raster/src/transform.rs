//! Affine pixel ↔ geographic transform.
//!
//! Coefficients follow the GDAL/rasterio convention:
//!
//! ```text
//! x = a * col + b * row + c
//! y = d * col + e * row + f
//! ```
//!
//! For a north-up raster `b = d = 0`, `a` is the pixel width and `e` the
//! (negative) pixel height; `(c, f)` is the outer corner of pixel (0, 0).

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use aqi_common::GeoBounds;

/// Six-coefficient affine transform owned by a raster file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform from an origin (upper-left corner) and pixel size.
    pub fn north_up(origin_lon: f64, origin_lat: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_lon, 0.0, -pixel_height, origin_lat)
    }

    /// Build from GeoTIFF `ModelPixelScaleTag` and `ModelTiepointTag` values.
    ///
    /// Only the first tiepoint is used; it ties raster point (I, J) to model
    /// point (X, Y).
    pub fn from_scale_and_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }
        let (sx, sy) = (scale[0], scale[1]);
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let transform = Self::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy);
        transform.is_invertible().then_some(transform)
    }

    /// Build from a GeoTIFF `ModelTransformationTag` (4×4 row-major matrix).
    pub fn from_model_transformation(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 16 {
            return None;
        }
        let transform = Self::new(
            matrix[0], matrix[1], matrix[3], matrix[4], matrix[5], matrix[7],
        );
        transform.is_invertible().then_some(transform)
    }

    fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.a, self.b, self.c, //
            self.d, self.e, self.f, //
            0.0, 0.0, 1.0,
        )
    }

    /// True when all coefficients are finite and the linear part is non-singular.
    pub fn is_invertible(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.e, self.f]
            .iter()
            .all(|v| v.is_finite())
            && (self.a * self.e - self.b * self.d).abs() > f64::EPSILON * 1e-6
    }

    /// Map fractional pixel coordinates to model coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let out = self.matrix() * Vector3::new(col, row, 1.0);
        (out.x, out.y)
    }

    /// Map model coordinates to fractional pixel coordinates as (col, row).
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let inverse = self.matrix().try_inverse()?;
        let out = inverse * Vector3::new(x, y, 1.0);
        (out.x.is_finite() && out.y.is_finite()).then_some((out.x, out.y))
    }

    /// Geographic coordinates (lon, lat) of a pixel center.
    pub fn pixel_center(&self, row: i64, col: i64) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Pixel (row, col) containing a geographic point, floored.
    pub fn pixel_containing(&self, lon: f64, lat: f64) -> Option<(i64, i64)> {
        let (col, row) = self.invert(lon, lat)?;
        Some((row.floor() as i64, col.floor() as i64))
    }

    /// Geographic extent of a `width` × `height` raster under this transform.
    pub fn bounds(&self, width: usize, height: usize) -> GeoBounds {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(width as f64, 0.0),
            self.apply(0.0, height as f64),
            self.apply(width as f64, height as f64),
        ];
        let mut bounds = GeoBounds::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (x, y) in corners {
            bounds.west = bounds.west.min(x);
            bounds.east = bounds.east.max(x);
            bounds.south = bounds.south.min(y);
            bounds.north = bounds.north.max(y);
        }
        bounds
    }
}
