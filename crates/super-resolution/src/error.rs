//! Error types for super-resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or running the network.
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// The model file does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(PathBuf),

    /// ONNX Runtime could not build a session from the model file.
    #[error("model init failed: {0}")]
    ModelInit(String),

    /// The session rejected the input or failed while running.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Input or output tensor does not match the tile.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The tile has no valid samples to normalize against.
    #[error("tile has no valid samples")]
    EmptyInput,

    /// The network produced NaN or infinite values.
    #[error("network output is not finite")]
    NonFiniteOutput,
}

impl EnhanceError {
    pub fn model_init(msg: impl Into<String>) -> Self {
        Self::ModelInit(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Short machine-readable tag for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelNotFound(_) => "model_not_found",
            Self::ModelInit(_) => "model_init",
            Self::Inference(_) => "inference_failed",
            Self::ShapeMismatch(_) => "shape_mismatch",
            Self::EmptyInput => "empty_input",
            Self::NonFiniteOutput => "non_finite_output",
        }
    }
}

/// Result type for super-resolution operations.
pub type Result<T> = std::result::Result<T, EnhanceError>;
