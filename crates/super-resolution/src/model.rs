//! ONNX SRCNN session.
//!
//! The trained network is exported once to ONNX and run through ONNX
//! Runtime. It takes a single float input shaped `(1, height, width, 1)`
//! (NHWC, values in [0, 1]) and returns one output of the same element
//! count. Height and width may be fixed or symbolic in the graph; a model
//! exported with fixed dimensions only accepts tiles of that size.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::info;

use crate::error::{EnhanceError, Result};

/// Intra-op threads per session; requests already run on the blocking pool.
pub const DEFAULT_INTRA_THREADS: usize = 2;

/// A loaded SRCNN model.
///
/// `Session::run` needs `&mut`, so the session sits behind a mutex and
/// concurrent tiles are enhanced one after another.
pub struct SrcnnModel {
    session: Mutex<Session>,
    path: PathBuf,
}

impl fmt::Debug for SrcnnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SrcnnModel")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SrcnnModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_threads(path, DEFAULT_INTRA_THREADS)
    }

    pub fn load_with_threads(path: impl AsRef<Path>, intra_threads: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EnhanceError::ModelNotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| EnhanceError::model_init(e.to_string()))?
            .with_intra_threads(intra_threads.max(1))
            .map_err(|e: ort::Error| EnhanceError::model_init(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e: ort::Error| EnhanceError::model_init(format!("ONNX load failed: {e}")))?;

        info!(path = %path.display(), intra_threads, "Loaded SRCNN model");

        Ok(Self {
            session: Mutex::new(session),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the network over a normalized single-channel image in row-major
    /// order, returning the output in the same order.
    pub fn predict(&self, height: usize, width: usize, input: Vec<f32>) -> Result<Vec<f32>> {
        let expected = height * width;
        let array = Array4::from_shape_vec((1, height, width, 1), input)
            .map_err(|e| EnhanceError::shape_mismatch(e.to_string()))?;
        let tensor = TensorRef::from_array_view(&array)
            .map_err(|e| EnhanceError::inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EnhanceError::inference("session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| EnhanceError::inference(format!("ONNX inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EnhanceError::inference(format!("output extraction: {e}")))?;
        check_output_len(shape, data.len(), expected)?;

        Ok(data.to_vec())
    }
}

/// The output must carry one value per input pixel, whatever its layout.
fn check_output_len(shape: &[i64], len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(EnhanceError::shape_mismatch(format!(
            "output shape {shape:?} has {len} values, expected {expected}"
        )));
    }
    Ok(())
}
