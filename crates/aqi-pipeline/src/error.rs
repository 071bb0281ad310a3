//! Error types for the AQI pipeline.

use thiserror::Error;

use geo_raster::RasterError;

/// Sampling produced nothing usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("no valid features in {pixels} sampled pixels")]
    NoValidFeatures { pixels: usize },
}

/// The synthetic generator could not build a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    #[error("request bounds are not finite")]
    NonFiniteBounds,
}

/// Reasons the real-data path gave up. Each one degrades the response to
/// the synthetic grid.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No raster file was loaded at startup.
    #[error("raster unavailable: {0}")]
    RasterUnavailable(String),

    /// The request cannot be mapped onto the raster.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl PipelineError {
    /// Machine-readable reason reported in response metadata and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RasterUnavailable(_) => "raster_unavailable",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Raster(e) => e.kind(),
            Self::Sample(SampleError::NoValidFeatures { .. }) => "no_valid_features",
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
