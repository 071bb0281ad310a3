//! Shared test utilities for the AQI map workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic raster generators
//! - GeoTIFF fixture writers (stripped and tiled)
//! - A stand-in ONNX model for enhancement tests
//! - Delhi bounding boxes and grid layouts
//! - Float assertion macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures::grid::DELHI_40, GeoTiffFixture};
//! ```

pub mod fixtures;
pub mod generators;
pub mod geotiff;
pub mod onnx;

// Re-export commonly used items at the crate root
pub use fixtures::{bounds_for, request_for};
pub use generators::*;
pub use geotiff::{GeoTiffFixture, Georeferencing};
pub use onnx::OnnxModelFixture;

/// Assert that two floats are within `tol` of each other.
///
/// Either side may be `f32` or `f64`. NaN never compares equal. An optional
/// trailing format string is prefixed to the failure message.
///
/// ```ignore
/// assert_approx_eq!(transform.a, 0.01, 1e-12);
/// assert_approx_eq!(out[i], expected[i], 1e-3, "pixel {i}");
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr $(,)?) => {
        $crate::check_approx($actual as f64, $expected as f64, $tol as f64, None)
    };
    ($actual:expr, $expected:expr, $tol:expr, $($context:tt)+) => {
        $crate::check_approx(
            $actual as f64,
            $expected as f64,
            $tol as f64,
            Some(format!($($context)+)),
        )
    };
}

/// Assert that two `(x, y)` pairs match component-wise within `tol`.
///
/// ```ignore
/// assert_coords_approx_eq!(mapper.pixel_to_geo(0, 0), (77.0005, 28.7995), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr $(,)?) => {{
        let (ax, ay) = $actual;
        let (ex, ey) = $expected;
        $crate::assert_approx_eq!(ax, ex, $tol, "x of ({}, {})", ax, ay);
        $crate::assert_approx_eq!(ay, ey, $tol, "y of ({}, {})", ax, ay);
    }};
}

#[doc(hidden)]
#[track_caller]
pub fn check_approx(actual: f64, expected: f64, tol: f64, context: Option<String>) {
    let diff = (actual - expected).abs();
    if diff <= tol {
        return;
    }
    let detail = format!("{actual} is not within {tol} of {expected} (off by {diff})");
    match context {
        Some(context) => panic!("{context}: {detail}"),
        None => panic!("{detail}"),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_within_tolerance() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(87.5_f32, 87.5_f64, 0.0);
        assert_approx_eq!(-5.5, -5.500001, 0.0001, "mixed signs");
    }

    #[test]
    #[should_panic(expected = "pixel 3: 1.1 is not within")]
    fn test_approx_reports_context() {
        assert_approx_eq!(1.1, 1.0, 0.001, "pixel {}", 3);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_approx_rejects_nan() {
        assert_approx_eq!(f64::NAN, f64::NAN, 1.0);
    }

    #[test]
    #[should_panic(expected = "y of (1, 2.5)")]
    fn test_coords_names_failing_axis() {
        assert_coords_approx_eq!((1.0, 2.5), (1.0, 2.0), 0.1);
    }
}
