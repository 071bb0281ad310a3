//! Request box → pixel window.

use tracing::debug;

use aqi_common::AirQualityRequest;

use crate::error::{RasterError, Result};
use crate::mapper::CoordinateMapper;
use crate::types::PixelWindow;

impl PixelWindow {
    /// Compute the window covering a request box on a `width` × `height` raster.
    ///
    /// The upper-left corner comes from `(lon_min, lat_max)` and the
    /// lower-right from `(lon_max, lat_min)`. Corners are clamped into the
    /// raster, inverted axes are swapped, and a zero-extent axis is widened to
    /// one pixel where the raster allows it.
    pub fn from_bbox(
        mapper: &CoordinateMapper,
        request: &AirQualityRequest,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let (row_a, col_a) = mapper.geo_to_pixel(request.lon_min, request.lat_max);
        let (row_b, col_b) = mapper.geo_to_pixel(request.lon_max, request.lat_min);

        let (row_min, row_max) = clamp_axis(row_a, row_b, height);
        let (col_min, col_max) = clamp_axis(col_a, col_b, width);

        if row_min >= row_max || col_min >= col_max {
            return Err(RasterError::DegenerateWindow {
                row_min,
                row_max,
                col_min,
                col_max,
            });
        }

        debug!(row_min, row_max, col_min, col_max, "pixel window");
        Ok(Self::new(
            row_min as usize,
            row_max as usize,
            col_min as usize,
            col_max as usize,
        ))
    }
}

fn clamp_axis(a: i64, b: i64, dim: usize) -> (i64, i64) {
    let last = (dim as i64 - 1).max(0);
    let a = a.clamp(0, last);
    let b = b.clamp(0, last);
    let (lo, mut hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        hi = (lo + 1).min(last);
    }
    (lo, hi)
}
