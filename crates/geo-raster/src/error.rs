//! Error types for raster access.

use thiserror::Error;

/// Errors that can occur while opening or reading a raster.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Failed to open the raster file.
    #[error("failed to open raster: {0}")]
    OpenFailed(String),

    /// Failed to decode raster data.
    #[error("failed to read raster data: {0}")]
    ReadFailed(String),

    /// Invalid georeferencing or layout metadata.
    #[error("invalid raster metadata: {0}")]
    InvalidMetadata(String),

    /// The clamped pixel window has no extent.
    #[error("degenerate window: rows({row_min},{row_max}), cols({col_min},{col_max})")]
    DegenerateWindow {
        row_min: i64,
        row_max: i64,
        col_min: i64,
        col_max: i64,
    },

    /// The window read returned no valid values.
    #[error("no valid data in window: {0}")]
    EmptyTile(String),
}

impl RasterError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Short machine-readable tag, used for fallback reasons and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpenFailed(_) => "raster_open_failed",
            Self::ReadFailed(_) => "raster_read_failed",
            Self::InvalidMetadata(_) => "raster_invalid_metadata",
            Self::DegenerateWindow { .. } => "degenerate_window",
            Self::EmptyTile(_) => "empty_tile",
        }
    }
}

impl From<std::io::Error> for RasterError {
    fn from(err: std::io::Error) -> Self {
        Self::OpenFailed(err.to_string())
    }
}

impl From<tiff::TiffError> for RasterError {
    fn from(err: tiff::TiffError) -> Self {
        Self::ReadFailed(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
