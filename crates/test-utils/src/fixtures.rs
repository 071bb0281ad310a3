//! Common test fixtures.

use aqi_common::{AirQualityRequest, GeoBounds};

/// Bounding boxes used across the suite, as (west, south, east, north).
pub mod bbox {
    /// The Delhi region covered by the NO2 raster.
    pub const DELHI: (f64, f64, f64, f64) = (77.0, 28.4, 77.4, 28.8);

    /// The viewport the web client opens with.
    pub const DELHI_VIEWPORT: (f64, f64, f64, f64) = (76.8, 28.4, 77.4, 28.9);

    /// A small neighbourhood box (about 1 km across).
    pub const CONNAUGHT_PLACE: (f64, f64, f64, f64) = (77.21, 28.62, 77.22, 28.63);

    /// Somewhere the raster does not cover.
    pub const MUMBAI: (f64, f64, f64, f64) = (72.8, 18.9, 72.9, 19.0);
}

/// Raster grid descriptions used to build fixture files.
pub mod grid {
    /// A raster layout: size plus north-up georeferencing.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub west: f64,
        pub north: f64,
        pub pixel_size: f64,
    }

    impl GridSpec {
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// (west, south, east, north) of the whole grid.
        pub fn bbox(&self) -> (f64, f64, f64, f64) {
            (
                self.west,
                self.north - self.height as f64 * self.pixel_size,
                self.west + self.width as f64 * self.pixel_size,
                self.north,
            )
        }
    }

    /// 400 × 400 pixels of 0.001° over the Delhi region.
    pub const DELHI_400: GridSpec = GridSpec {
        width: 400,
        height: 400,
        west: 77.0,
        north: 28.8,
        pixel_size: 0.001,
    };

    /// 100 × 100 pixels of 0.004°; not a multiple of common tile sizes.
    pub const DELHI_100: GridSpec = GridSpec {
        width: 100,
        height: 100,
        west: 77.0,
        north: 28.8,
        pixel_size: 0.004,
    };

    /// 40 × 40 pixels of 0.01° over the Delhi region.
    pub const DELHI_40: GridSpec = GridSpec {
        width: 40,
        height: 40,
        west: 77.0,
        north: 28.8,
        pixel_size: 0.01,
    };
}

/// Build a request from a (west, south, east, north) box.
pub fn request_for(bbox: (f64, f64, f64, f64), zoom_level: f64) -> AirQualityRequest {
    let (west, south, east, north) = bbox;
    AirQualityRequest::new(south, north, west, east, zoom_level)
}

/// `GeoBounds` from a (west, south, east, north) box.
pub fn bounds_for(bbox: (f64, f64, f64, f64)) -> GeoBounds {
    let (west, south, east, north) = bbox;
    GeoBounds::new(west, south, east, north)
}
