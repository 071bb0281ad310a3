//! Zoom-dependent subsampling of a raster tile into AQI point features.

use tracing::debug;

use aqi_common::{AqiFeature, ValueRange};
use geo_raster::{CoordinateMapper, RasterTile};

use crate::error::SampleError;

/// Points requested at zoom 10; scales linearly with zoom.
pub const POINTS_AT_ZOOM_10: f64 = 500.0;

/// Turns tile pixels into GeoJSON features.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSampler<'a> {
    mapper: &'a CoordinateMapper,
    value_range: ValueRange,
}

impl<'a> FeatureSampler<'a> {
    pub fn new(mapper: &'a CoordinateMapper, value_range: ValueRange) -> Self {
        Self {
            mapper,
            value_range,
        }
    }

    /// Desired feature count for a zoom level, at least 1.
    pub fn target_count(zoom_level: f64) -> f64 {
        let target = POINTS_AT_ZOOM_10 * zoom_level / 10.0;
        if target.is_finite() {
            target.max(1.0)
        } else {
            1.0
        }
    }

    /// Step between visited pixels in flattened row-major order.
    pub fn stride(pixels: usize, zoom_level: f64) -> usize {
        let stride = (pixels as f64 / Self::target_count(zoom_level)).floor();
        (stride as usize).max(1)
    }

    /// Sample `values` (laid out like `tile`) at the zoom-dependent stride.
    ///
    /// `values` is usually `tile.data`, or the enhanced values for the same
    /// window. NaN pixels are skipped.
    pub fn sample(
        &self,
        tile: &RasterTile,
        values: &[f32],
        zoom_level: f64,
    ) -> Result<Vec<AqiFeature>, SampleError> {
        let pixels = tile.rows * tile.cols;
        let stride = Self::stride(pixels, zoom_level);
        let mut features = Vec::with_capacity(pixels / stride + 1);

        for index in (0..pixels.min(values.len())).step_by(stride) {
            let value = values[index];
            if value.is_nan() {
                continue;
            }
            let Some(aqi) = self.value_range.to_aqi(f64::from(value)) else {
                continue;
            };

            let row = (tile.window.row_min + index / tile.cols) as i64;
            let col = (tile.window.col_min + index % tile.cols) as i64;
            let (lon, lat) = self.mapper.pixel_to_geo(row, col);
            features.push(AqiFeature::new(lon, lat, aqi).with_model_data());
        }

        debug!(pixels, stride, features = features.len(), "Sampled tile");

        if features.is_empty() {
            return Err(SampleError::NoValidFeatures { pixels });
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_common::{color_for_aqi, DEFAULT_BOUNDS};
    use geo_raster::{GeoTransform, PixelWindow};

    fn mapper() -> CoordinateMapper {
        let transform = GeoTransform::north_up(77.0, 28.8, 0.001, 0.001);
        CoordinateMapper::new(
            Some(transform),
            Some(transform.bounds(400, 400)),
            DEFAULT_BOUNDS,
        )
    }

    #[test]
    fn test_stride() {
        assert_eq!(FeatureSampler::stride(100 * 100, 10.0), 20);
        assert_eq!(FeatureSampler::stride(100, 10.0), 1);
        assert_eq!(FeatureSampler::stride(1000, 20.0), 1);
        assert_eq!(FeatureSampler::stride(5000, 0.0), 5000);
        assert_eq!(FeatureSampler::stride(5000, f64::NAN), 5000);
    }

    #[test]
    fn test_count_independent_of_shape() {
        let mapper = mapper();
        let sampler = FeatureSampler::new(&mapper, ValueRange::default());
        for (rows, cols) in [(100, 100), (10, 1000), (1000, 10), (1, 10_000)] {
            let tile = RasterTile::new(
                vec![100.0; rows * cols],
                PixelWindow::new(0, rows, 0, cols),
            );
            let features = sampler.sample(&tile, &tile.data, 10.0).unwrap();
            assert_eq!(features.len(), 500, "shape {}x{}", rows, cols);
        }
    }

    #[test]
    fn test_features_use_window_offset() {
        let mapper = mapper();
        let sampler = FeatureSampler::new(&mapper, ValueRange::default());
        let tile = RasterTile::new(vec![51.0], PixelWindow::new(10, 11, 20, 21));

        let features = sampler.sample(&tile, &tile.data, 10.0).unwrap();
        assert_eq!(features.len(), 1);
        let (lon, lat) = mapper.pixel_to_geo(10, 20);
        assert_eq!(features[0].lon(), lon);
        assert_eq!(features[0].lat(), lat);
        // 51 * 500 / 255 = 100
        assert_eq!(features[0].properties.aqi, 100);
        assert_eq!(features[0].properties.color, color_for_aqi(100));
        assert_eq!(features[0].properties.is_model_data, Some(true));
    }

    #[test]
    fn test_nan_skipped() {
        let mapper = mapper();
        let sampler = FeatureSampler::new(&mapper, ValueRange::default());
        let tile = RasterTile::new(
            vec![f32::NAN, 10.0, f32::NAN, 20.0],
            PixelWindow::new(0, 2, 0, 2),
        );
        let features = sampler.sample(&tile, &tile.data, 10.0).unwrap();
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn test_all_nan_is_error() {
        let mapper = mapper();
        let sampler = FeatureSampler::new(&mapper, ValueRange::default());
        let tile = RasterTile::new(vec![f32::NAN; 9], PixelWindow::new(0, 3, 0, 3));
        assert_eq!(
            sampler.sample(&tile, &tile.data, 10.0),
            Err(SampleError::NoValidFeatures { pixels: 9 })
        );
    }

    #[test]
    fn test_values_clamped_into_index() {
        let mapper = mapper();
        let sampler = FeatureSampler::new(&mapper, ValueRange::default());
        let tile = RasterTile::new(vec![-40.0, 900.0], PixelWindow::new(0, 1, 0, 2));
        let features = sampler.sample(&tile, &tile.data, 10.0).unwrap();
        assert_eq!(features[0].properties.aqi, 0);
        assert_eq!(features[1].properties.aqi, 500);
    }
}
