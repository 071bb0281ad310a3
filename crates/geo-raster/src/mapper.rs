//! Geographic ↔ pixel coordinate mapping with tiered fallbacks.
//!
//! The mapper prefers the raster's affine transform. When that is missing it
//! interpolates linearly over the raster bounds, and as a last resort over the
//! process-wide default bounds. Fallback tiers assume a fixed
//! `FALLBACK_GRID_SIZE` × `FALLBACK_GRID_SIZE` pixel grid with rows counted
//! from the north edge.

use tracing::debug;

use aqi_common::GeoBounds;

use crate::transform::GeoTransform;
use crate::types::RasterMetadata;

/// Cells per axis assumed by the bounds-based fallback formula.
pub const FALLBACK_GRID_SIZE: f64 = 1000.0;

/// Transform results beyond this pixel index are treated as suspicious.
pub const MAX_PLAUSIBLE_PIXEL: i64 = 10_000;

/// Which mapping strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTier {
    /// Affine transform from the raster file.
    Transform,
    /// Linear interpolation over the raster bounds.
    Bounds,
    /// Linear interpolation over the default bounds.
    Default,
}

impl MappingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Bounds => "bounds",
            Self::Default => "default",
        }
    }
}

/// Converts between pixel (row, col) and geographic (lon, lat) positions.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    transform: Option<GeoTransform>,
    bounds: Option<GeoBounds>,
    default_bounds: GeoBounds,
}

impl CoordinateMapper {
    pub fn new(
        transform: Option<GeoTransform>,
        bounds: Option<GeoBounds>,
        default_bounds: GeoBounds,
    ) -> Self {
        Self {
            transform,
            bounds,
            default_bounds,
        }
    }

    /// Mapper for a raster whose metadata was read at startup.
    pub fn from_metadata(metadata: &RasterMetadata, default_bounds: GeoBounds) -> Self {
        Self::new(metadata.transform, metadata.bounds, default_bounds)
    }

    /// Mapper with no georeferencing at all; every call uses the default bounds.
    pub fn unreferenced(default_bounds: GeoBounds) -> Self {
        Self::new(None, None, default_bounds)
    }

    pub fn transform(&self) -> Option<&GeoTransform> {
        self.transform.as_ref()
    }

    pub fn bounds(&self) -> Option<&GeoBounds> {
        self.bounds.as_ref()
    }

    pub fn default_bounds(&self) -> &GeoBounds {
        &self.default_bounds
    }

    /// Geographic (lon, lat) of a pixel.
    pub fn pixel_to_geo(&self, row: i64, col: i64) -> (f64, f64) {
        self.pixel_to_geo_traced(row, col).0
    }

    /// Like [`pixel_to_geo`](Self::pixel_to_geo), also reporting the tier used.
    pub fn pixel_to_geo_traced(&self, row: i64, col: i64) -> ((f64, f64), MappingTier) {
        if let Some(transform) = &self.transform {
            let (lon, lat) = transform.pixel_center(row, col);
            if lon.is_finite() && lat.is_finite() {
                return ((lon, lat), MappingTier::Transform);
            }
            debug!(row, col, "transform produced non-finite coordinates");
        }

        if let Some(bounds) = self.bounds.filter(GeoBounds::is_valid) {
            let (lon, lat) = grid_to_geo(&bounds, row, col);
            if lon.is_finite() && lat.is_finite() {
                return ((lon, lat), MappingTier::Bounds);
            }
        }

        debug!(row, col, "pixel_to_geo using default bounds");
        (
            grid_to_geo(&self.default_bounds, row, col),
            MappingTier::Default,
        )
    }

    /// Pixel (row, col) containing a geographic point.
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> (i64, i64) {
        self.geo_to_pixel_traced(lon, lat).0
    }

    /// Like [`geo_to_pixel`](Self::geo_to_pixel), also reporting the tier used.
    pub fn geo_to_pixel_traced(&self, lon: f64, lat: f64) -> ((i64, i64), MappingTier) {
        if let Some(transform) = &self.transform {
            match transform.pixel_containing(lon, lat) {
                Some((row, col)) if is_plausible(row) && is_plausible(col) => {
                    return ((row, col), MappingTier::Transform);
                }
                Some((row, col)) => {
                    debug!(lon, lat, row, col, "suspicious pixel from transform");
                    return (self.default_geo_to_pixel(lon, lat), MappingTier::Default);
                }
                None => {
                    debug!(lon, lat, "transform inverse failed");
                    return (self.default_geo_to_pixel(lon, lat), MappingTier::Default);
                }
            }
        }

        if let Some(bounds) = self.bounds.filter(GeoBounds::is_valid) {
            if let Some(pixel) = geo_to_grid(&bounds, lon, lat) {
                return (pixel, MappingTier::Bounds);
            }
        }

        debug!(lon, lat, "geo_to_pixel using default bounds");
        (self.default_geo_to_pixel(lon, lat), MappingTier::Default)
    }

    fn default_geo_to_pixel(&self, lon: f64, lat: f64) -> (i64, i64) {
        let bounds = &self.default_bounds;
        // NaN inputs land on the north-west corner.
        let lon = if lon.is_finite() { lon } else { bounds.west };
        let lat = if lat.is_finite() { lat } else { bounds.north };
        let (lon, lat) = bounds.clamp_point(lon, lat);
        geo_to_grid(bounds, lon, lat).unwrap_or((0, 0))
    }
}

fn is_plausible(index: i64) -> bool {
    (0..=MAX_PLAUSIBLE_PIXEL).contains(&index)
}

fn grid_to_geo(bounds: &GeoBounds, row: i64, col: i64) -> (f64, f64) {
    let lon = bounds.west + bounds.width() * col as f64 / FALLBACK_GRID_SIZE;
    let lat = bounds.north - bounds.height() * row as f64 / FALLBACK_GRID_SIZE;
    (lon, lat)
}

fn geo_to_grid(bounds: &GeoBounds, lon: f64, lat: f64) -> Option<(i64, i64)> {
    let col = (FALLBACK_GRID_SIZE * (lon - bounds.west) / bounds.width()).floor();
    let row = (FALLBACK_GRID_SIZE * (bounds.north - lat) / bounds.height()).floor();
    (col.is_finite() && row.is_finite()).then_some((row as i64, col as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_common::DEFAULT_BOUNDS;
    use test_utils::assert_coords_approx_eq;

    fn with_transform() -> CoordinateMapper {
        let transform = GeoTransform::north_up(77.0, 28.8, 0.001, 0.001);
        CoordinateMapper::new(
            Some(transform),
            Some(transform.bounds(400, 400)),
            DEFAULT_BOUNDS,
        )
    }

    #[test]
    fn test_transform_tier() {
        let mapper = with_transform();
        let (center, tier) = mapper.pixel_to_geo_traced(0, 0);
        assert_eq!(tier, MappingTier::Transform);
        assert_coords_approx_eq!(center, (77.0005, 28.7995), 1e-9);
    }

    #[test]
    fn test_round_trip_with_transform() {
        let mapper = with_transform();
        for row in (0..400).step_by(37) {
            for col in (0..400).step_by(41) {
                let (lon, lat) = mapper.pixel_to_geo(row, col);
                assert_eq!(mapper.geo_to_pixel(lon, lat), (row, col));
            }
        }
    }

    #[test]
    fn test_suspicious_pixel_falls_back() {
        let mapper = with_transform();
        // 20 degrees east of the origin is 20000 pixels away.
        let ((row, col), tier) = mapper.geo_to_pixel_traced(97.0, 35.0);
        assert_eq!(tier, MappingTier::Default);
        // Clamped to the north-east corner of the default bounds.
        assert_eq!((row, col), (0, 1000));
    }

    #[test]
    fn test_negative_pixel_falls_back() {
        let mapper = with_transform();
        let (_, tier) = mapper.geo_to_pixel_traced(76.9, 28.6);
        assert_eq!(tier, MappingTier::Default);
    }

    #[test]
    fn test_bounds_tier() {
        let bounds = GeoBounds::new(76.0, 28.0, 78.0, 30.0);
        let mapper = CoordinateMapper::new(None, Some(bounds), DEFAULT_BOUNDS);

        let ((row, col), tier) = mapper.geo_to_pixel_traced(77.0, 29.0);
        assert_eq!(tier, MappingTier::Bounds);
        assert_eq!((row, col), (500, 500));

        let ((lon, lat), tier) = mapper.pixel_to_geo_traced(0, 1000);
        assert_eq!(tier, MappingTier::Bounds);
        assert_eq!((lon, lat), (78.0, 30.0));
    }

    #[test]
    fn test_invalid_bounds_skipped() {
        let bounds = GeoBounds::new(78.0, 28.0, 76.0, 30.0);
        let mapper = CoordinateMapper::new(None, Some(bounds), DEFAULT_BOUNDS);
        let (_, tier) = mapper.geo_to_pixel_traced(77.0, 29.0);
        assert_eq!(tier, MappingTier::Default);
    }

    #[test]
    fn test_unreferenced_clamps_into_default_bounds() {
        let mapper = CoordinateMapper::unreferenced(DEFAULT_BOUNDS);
        assert_eq!(mapper.geo_to_pixel(60.0, 40.0), (0, 0));
        assert_eq!(mapper.geo_to_pixel(90.0, 10.0), (1000, 1000));
        assert_eq!(mapper.geo_to_pixel(f64::NAN, f64::NAN), (0, 0));
    }

    #[test]
    fn test_unreferenced_pixel_to_geo() {
        let mapper = CoordinateMapper::unreferenced(DEFAULT_BOUNDS);
        let ((lon, lat), tier) = mapper.pixel_to_geo_traced(500, 500);
        assert_eq!(tier, MappingTier::Default);
        assert!((lon - 77.2).abs() < 1e-9);
        assert!((lat - 28.6).abs() < 1e-9);
    }
}
