//! Enhancement of raster tiles through ONNX sessions.

use geo_raster::{PixelWindow, RasterTile};
use super_resolution::{EnhanceError, Enhancer, SrcnnModel};
use test_utils::{
    assert_approx_eq, create_constant_grid, create_plume_grid, with_patches, OnnxModelFixture,
};

fn tile(data: Vec<f32>, rows: usize, cols: usize) -> RasterTile {
    RasterTile::new(data, PixelWindow::new(100, 100 + rows, 50, 50 + cols))
}

fn enhancer(model: OnnxModelFixture) -> Enhancer {
    let (_dir, path) = model.write_temp().unwrap();
    // The session holds the graph in memory; the file can go.
    Enhancer::load(&path).unwrap()
}

// ============================================================================
// Enhancement
// ============================================================================

#[test]
fn test_identity_model_reproduces_tile() {
    let enhancer = enhancer(OnnxModelFixture::identity());
    let data = create_plume_grid(12, 9);
    let input = tile(data.clone(), 9, 12);

    let output = enhancer.enhance(&input).unwrap();
    assert_eq!(output.len(), data.len());
    for (out, expected) in output.iter().zip(&data) {
        assert_approx_eq!(*out, *expected, 1e-3);
    }
}

#[test]
fn test_non_square_tile_keeps_row_order() {
    let enhancer = enhancer(OnnxModelFixture::identity());
    let data: Vec<f32> = (0..15).map(|i| i as f32).collect();
    let output = enhancer.enhance(&tile(data.clone(), 3, 5)).unwrap();
    for (out, expected) in output.iter().zip(&data) {
        assert_approx_eq!(*out, *expected, 1e-4);
    }
}

#[test]
fn test_output_scaled_back_to_tile_range() {
    // +0.25 in normalized space is a quarter of the tile's span.
    let enhancer = enhancer(OnnxModelFixture::affine(1.0, 0.25));
    let data = create_plume_grid(10, 10);
    let (min, max) = tile(data.clone(), 10, 10).value_range().unwrap();
    let shift = 0.25 * (max - min);

    let output = enhancer.enhance(&tile(data.clone(), 10, 10)).unwrap();
    for (out, input) in output.iter().zip(&data) {
        assert_approx_eq!(*out, *input + shift, 1e-2);
    }
}

#[test]
fn test_constant_tile_stays_constant() {
    let enhancer = enhancer(OnnxModelFixture::affine(3.0, 1.0));
    let input = tile(create_constant_grid(8, 8, 87.5), 8, 8);
    let output = enhancer.enhance(&input).unwrap();
    assert!(output.iter().all(|&v| v == 87.5));
}

#[test]
fn test_nan_pixels_become_tile_minimum() {
    let enhancer = enhancer(OnnxModelFixture::identity());
    let data = with_patches(create_plume_grid(10, 10), 10, &[(0, 0)], f32::NAN);
    let (min, _) = tile(data.clone(), 10, 10).value_range().unwrap();

    let output = enhancer.enhance(&tile(data, 10, 10)).unwrap();
    assert!(output.iter().all(|v| v.is_finite()));
    assert_approx_eq!(output[0], min, 1e-4);
}

#[test]
fn test_single_pixel_tile() {
    let enhancer = enhancer(OnnxModelFixture::identity());
    let output = enhancer.enhance(&tile(vec![42.0], 1, 1)).unwrap();
    assert_eq!(output, vec![42.0]);
}

#[test]
fn test_empty_tile_rejected() {
    let enhancer = enhancer(OnnxModelFixture::identity());
    let input = RasterTile::new(vec![f32::NAN; 4], PixelWindow::new(0, 2, 0, 2));
    assert!(matches!(
        enhancer.enhance(&input),
        Err(EnhanceError::EmptyInput)
    ));
}

#[test]
fn test_non_finite_output_rejected() {
    let enhancer = enhancer(OnnxModelFixture::affine(f32::INFINITY, 0.0));
    let err = enhancer
        .enhance(&tile(create_plume_grid(6, 6), 6, 6))
        .unwrap_err();
    assert!(matches!(err, EnhanceError::NonFiniteOutput));
}

#[test]
fn test_fixed_size_model_rejects_other_tiles() {
    let enhancer = enhancer(OnnxModelFixture::identity().fixed_size(8, 8));
    assert!(enhancer.enhance(&tile(create_plume_grid(8, 8), 8, 8)).is_ok());

    let err = enhancer
        .enhance(&tile(create_plume_grid(6, 5), 5, 6))
        .unwrap_err();
    assert_eq!(err.kind(), "inference_failed");
}

#[test]
fn test_shared_enhancer_across_threads() {
    let enhancer = std::sync::Arc::new(enhancer(OnnxModelFixture::identity()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let enhancer = enhancer.clone();
            std::thread::spawn(move || {
                let size = 4 + i;
                let input = tile(create_plume_grid(size, size), size, size);
                enhancer.enhance(&input).map(|out| out.len())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let size = 4 + i;
        assert_eq!(handle.join().unwrap().unwrap(), size * size);
    }
}

// ============================================================================
// Model files
// ============================================================================

#[test]
fn test_load_model_file() {
    let (_dir, path) = OnnxModelFixture::identity().write_temp().unwrap();
    let model = SrcnnModel::load_with_threads(&path, 1).unwrap();
    assert_eq!(model.path(), path.as_path());
    assert!(format!("{model:?}").contains("srcnn.onnx"));
}

#[test]
fn test_missing_model_file() {
    let err = Enhancer::load("/nonexistent/srcnn.onnx").unwrap_err();
    assert!(matches!(err, EnhanceError::ModelNotFound(_)));
    assert_eq!(err.kind(), "model_not_found");
}

#[test]
fn test_corrupt_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("srcnn.onnx");
    std::fs::write(&path, b"not an onnx graph").unwrap();

    let err = Enhancer::load(&path).unwrap_err();
    assert_eq!(err.kind(), "model_init");
}
