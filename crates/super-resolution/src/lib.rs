//! Super-resolution for air-quality raster tiles.
//!
//! A small SRCNN (three convolution layers) sharpens a window of the NO2
//! raster before it is sampled at close zoom levels. The trained network is
//! exported to ONNX and run through ONNX Runtime (`ort`).
//!
//! # Example
//!
//! ```ignore
//! use super_resolution::{Enhancer, SuperResolutionGate};
//!
//! let enhancer = Enhancer::load("model/srcnn.onnx")?;
//! if SuperResolutionGate::default().decide(&request, true).applies() {
//!     let values = enhancer.enhance(&tile)?;
//! }
//! ```

pub mod enhancer;
pub mod error;
pub mod model;

pub use enhancer::{Enhancer, GateDecision, SuperResolutionGate};
pub use error::{EnhanceError, Result};
pub use model::{SrcnnModel, DEFAULT_INTRA_THREADS};
