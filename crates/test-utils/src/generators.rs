//! Synthetic raster generators.
//!
//! These produce predictable pollutant-like grids so tests can assert on
//! exact pixel values after a window read or a sampling pass.

/// Creates a grid whose values encode their position.
///
/// Each cell value is `row * 1000 + col`, so a value read back through a
/// window identifies exactly which source pixel it came from.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1.0);     // row 0, col 1
/// assert_eq!(grid[10], 1000.0); // row 1, col 0
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((row * 1000 + col) as f32);
        }
    }
    data
}

/// Creates a diagonal gradient in the native 0-255 concentration range.
///
/// Top-left is 0, bottom-right approaches 255.
pub fn create_gradient_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push((x_factor + y_factor) * 127.5);
        }
    }
    data
}

/// Creates an NO2-like field: a smooth plume over a background level.
///
/// Values stay within 0-255, peaking near the grid center.
pub fn create_plume_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let sigma = (width.max(height) as f32 / 4.0).max(1.0);

    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let plume = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            data.push(40.0 + 200.0 * plume);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Replaces the given `(row, col)` positions with `fill`.
///
/// Out-of-range positions are ignored.
pub fn with_patches(
    mut data: Vec<f32>,
    width: usize,
    positions: &[(usize, usize)],
    fill: f32,
) -> Vec<f32> {
    for &(row, col) in positions {
        if col < width {
            if let Some(v) = data.get_mut(row * width + col) {
                *v = fill;
            }
        }
    }
    data
}

/// Creates a grid with NaN at the given `(row, col)` positions and `base`
/// elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    base: f32,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    with_patches(
        create_constant_grid(width, height, base),
        width,
        nan_positions,
        f32::NAN,
    )
}
