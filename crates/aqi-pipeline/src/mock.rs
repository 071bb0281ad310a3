//! Synthetic AQI grid used when real data is unavailable.
//!
//! Values rise diagonally from the south-west corner with Gaussian noise, so
//! the map still shows a plausible-looking field. The noise source is
//! injected to keep tests deterministic.

use std::f64::consts::TAU;

use rand::Rng;

use aqi_common::{clamp_aqi, AirQualityRequest, AqiFeature, FeatureCollection, ResponseMetadata};

use crate::error::MockError;

/// Smallest and largest grid size per axis.
pub const MIN_GRID_SIZE: usize = 5;
pub const MAX_GRID_SIZE: usize = 30;

/// AQI at the first grid point, and the increase per grid step.
const BASE_AQI: f64 = 50.0;
const AQI_PER_STEP: f64 = 5.0;
const NOISE_STD_DEV: f64 = 20.0;

/// The single point returned when even the synthetic grid fails.
pub const EMERGENCY_POINT: (f64, f64) = (77.2, 28.6);
pub const EMERGENCY_AQI: u16 = 150;

/// Generates a regular grid of synthetic AQI points over a request box.
#[derive(Debug)]
pub struct MockGenerator<R> {
    rng: R,
}

impl<R: Rng> MockGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Points per axis for a zoom level: `floor(zoom / 2)` within 5..=30.
    pub fn grid_size(zoom_level: f64) -> usize {
        let n = (zoom_level / 2.0).floor();
        if n.is_nan() {
            return MIN_GRID_SIZE;
        }
        n.clamp(MIN_GRID_SIZE as f64, MAX_GRID_SIZE as f64) as usize
    }

    /// Build the grid. Point (i, j) sits at row i from `lat_min` and column
    /// j from `lon_min`, corners included.
    pub fn generate(&mut self, request: &AirQualityRequest) -> Result<Vec<AqiFeature>, MockError> {
        if !request.is_finite() {
            return Err(MockError::NonFiniteBounds);
        }

        let n = Self::grid_size(request.zoom_level);
        let steps = (n - 1) as f64;
        let lat_step = (request.lat_max - request.lat_min) / steps;
        let lon_step = (request.lon_max - request.lon_min) / steps;

        let mut features = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let lat = request.lat_min + lat_step * i as f64;
                let lon = request.lon_min + lon_step * j as f64;
                let base = BASE_AQI + AQI_PER_STEP * (i + j) as f64;
                let aqi = clamp_aqi((base + self.gaussian(NOISE_STD_DEV)).floor());
                features.push(AqiFeature::new(lon, lat, aqi));
            }
        }
        Ok(features)
    }

    /// Zero-mean normal sample (Box-Muller).
    fn gaussian(&mut self, std_dev: f64) -> f64 {
        // gen::<f64>() is in [0, 1); flip to (0, 1] so ln() stays finite.
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        std_dev * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }
}

/// Last-resort response: one point in central Delhi.
pub fn emergency_collection(zoom_level: f64, reason: impl Into<String>) -> FeatureCollection {
    let (lon, lat) = EMERGENCY_POINT;
    FeatureCollection::new(
        vec![AqiFeature::new(lon, lat, EMERGENCY_AQI)],
        ResponseMetadata::emergency(zoom_level, reason),
    )
}
