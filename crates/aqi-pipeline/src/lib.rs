//! AQI Point Pipeline
//!
//! Turns a map viewport into colored AQI point features:
//!
//! 1. Map the request box to a pixel window on the NO2 raster
//! 2. Read the window
//! 3. Optionally sharpen it with the SRCNN enhancer (close zoom, small area)
//! 4. Subsample at a zoom-dependent stride and scale to the AQI index
//!
//! Any failure along the way degrades to a synthetic grid, and failure of the
//! synthetic grid to a single emergency point, so every request gets a
//! non-empty `FeatureCollection`.

pub mod error;
pub mod mock;
pub mod pipeline;
pub mod sampler;

pub use error::{MockError, PipelineError, Result, SampleError};
pub use mock::{emergency_collection, MockGenerator, EMERGENCY_AQI, EMERGENCY_POINT};
pub use pipeline::{
    AirQualityReport, AirQualityService, EnhanceOutcome, PipelineConfig, ResponseTier,
};
pub use sampler::FeatureSampler;
