//! Georeferenced Raster Access
//!
//! This crate turns a geographic request box into pixel data read from a
//! single-band GeoTIFF, and maps pixel positions back to coordinates.
//!
//! # Architecture
//!
//! ```text
//! AirQualityRequest (lat/lon box)
//!      │
//!      ▼
//! CoordinateMapper::geo_to_pixel ── affine transform
//!      │                              └─► bounds grid ─► default bounds
//!      ▼
//! PixelWindow::from_bbox (clamp, order, 1-pixel minimum)
//!      │
//!      ▼
//! GeoTiffSource::read_window (decode intersecting strips/tiles only)
//!      │
//!      ▼
//! RasterTile (f32, NaN = invalid)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use geo_raster::{CoordinateMapper, GeoTiffSource, PixelWindow};
//!
//! let source = GeoTiffSource::open("data/no2.tif")?;
//! let mapper = CoordinateMapper::from_metadata(source.metadata(), DEFAULT_BOUNDS);
//! let window = PixelWindow::from_bbox(&mapper, &request, source.width(), source.height())?;
//! let tile = source.read_window(&window)?;
//! ```

pub mod error;
pub mod geotiff;
pub mod mapper;
pub mod transform;
pub mod types;
pub mod window;

// Re-export commonly used types at crate root
pub use error::{RasterError, Result};
pub use geotiff::GeoTiffSource;
pub use mapper::{CoordinateMapper, MappingTier, FALLBACK_GRID_SIZE, MAX_PLAUSIBLE_PIXEL};
pub use transform::GeoTransform;
pub use types::{PixelWindow, RasterMetadata, RasterTile};
