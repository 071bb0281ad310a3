//! Request orchestration with tiered fallbacks.
//!
//! ```text
//! request ─► window ─► read ─► [enhance] ─► sample ─► real FeatureCollection
//!              │         │         │           │
//!              │         │         └─ failure: sample raw tile (used_model=false)
//!              └─────────┴──────── failure ────┴──► synthetic grid
//!                                                      └─ failure ─► emergency point
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use aqi_common::{
    AirQualityRequest, FeatureCollection, GeoBounds, ResponseMetadata, ValueRange, DEFAULT_BOUNDS,
};
use geo_raster::{CoordinateMapper, GeoTiffSource, PixelWindow};
use super_resolution::{Enhancer, GateDecision, SuperResolutionGate};

use crate::error::{PipelineError, Result};
use crate::mock::{emergency_collection, MockGenerator};
use crate::sampler::FeatureSampler;

/// Tunables for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frame for coordinate mapping when the raster has no georeferencing.
    pub default_bounds: GeoBounds,
    /// Native raster range mapped onto AQI 0..=500.
    pub value_range: ValueRange,
    pub super_resolution: SuperResolutionGate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_bounds: DEFAULT_BOUNDS,
            value_range: ValueRange::default(),
            super_resolution: SuperResolutionGate::default(),
        }
    }
}

/// Which tier produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTier {
    Enhanced,
    Raw,
    Synthetic,
    Emergency,
}

impl ResponseTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enhanced => "enhanced",
            Self::Raw => "raw",
            Self::Synthetic => "synthetic",
            Self::Emergency => "emergency",
        }
    }
}

/// What happened to super-resolution on one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceOutcome {
    /// Never reached (no tile was read).
    NotAttempted,
    Skipped(GateDecision),
    Applied,
    Failed(&'static str),
}

impl EnhanceOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::Skipped(decision) => decision.as_str(),
            Self::Applied => "applied",
            Self::Failed(_) => "failed",
        }
    }
}

/// A response plus how it was produced.
#[derive(Debug, Clone)]
pub struct AirQualityReport {
    pub collection: FeatureCollection,
    pub tier: ResponseTier,
    pub enhancement: EnhanceOutcome,
    /// Why the real-data path was abandoned, if it was.
    pub fallback_reason: Option<&'static str>,
}

/// Serves AQI features for request boxes. Immutable after construction.
#[derive(Debug)]
pub struct AirQualityService {
    raster: Option<GeoTiffSource>,
    mapper: CoordinateMapper,
    enhancer: Option<Enhancer>,
    config: PipelineConfig,
}

impl AirQualityService {
    pub fn new(
        raster: Option<GeoTiffSource>,
        enhancer: Option<Enhancer>,
        config: PipelineConfig,
    ) -> Self {
        let mapper = match &raster {
            Some(source) => CoordinateMapper::from_metadata(source.metadata(), config.default_bounds),
            None => CoordinateMapper::unreferenced(config.default_bounds),
        };
        Self {
            raster,
            mapper,
            enhancer,
            config,
        }
    }

    /// Load the raster and model from disk. Failures are logged and leave
    /// the corresponding component absent; the service always starts.
    pub fn open(raster_path: &Path, model_path: &Path, config: PipelineConfig) -> Self {
        let raster = match GeoTiffSource::open(raster_path) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(
                    path = %raster_path.display(),
                    error = %e,
                    "Raster not loaded; responses will use synthetic data"
                );
                None
            }
        };

        let enhancer = match Enhancer::load(model_path) {
            Ok(enhancer) => Some(enhancer),
            Err(e) => {
                error!(
                    path = %model_path.display(),
                    error = %e,
                    "Super-resolution model not loaded"
                );
                None
            }
        };

        let service = Self::new(raster, enhancer, config);
        info!(
            raster_loaded = service.raster.is_some(),
            model_loaded = service.model_loaded(),
            georeferenced = service.mapper.transform().is_some(),
            "AQI pipeline ready"
        );
        service
    }

    pub fn raster(&self) -> Option<&GeoTiffSource> {
        self.raster.as_ref()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn model_loaded(&self) -> bool {
        self.enhancer.is_some()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer a request using the thread-local RNG for synthetic noise.
    pub fn get_air_quality(&self, request: &AirQualityRequest) -> AirQualityReport {
        self.get_air_quality_with_rng(request, &mut rand::thread_rng())
    }

    /// Answer a request. Never fails: the weakest tier is a single point.
    pub fn get_air_quality_with_rng<R: Rng>(
        &self,
        request: &AirQualityRequest,
        rng: &mut R,
    ) -> AirQualityReport {
        let (reason, enhancement) = match self.real_data(request) {
            Ok(report) => return report,
            Err((e, enhancement)) => {
                warn!(error = %e, reason = e.reason(), "Real data unavailable, using synthetic grid");
                (e.reason(), enhancement)
            }
        };

        match MockGenerator::new(rng).generate(request) {
            Ok(features) => AirQualityReport {
                collection: FeatureCollection::new(
                    features,
                    ResponseMetadata::synthetic(request.zoom_level, reason),
                ),
                tier: ResponseTier::Synthetic,
                enhancement,
                fallback_reason: Some(reason),
            },
            Err(e) => {
                error!(error = %e, "Synthetic grid failed, returning emergency point");
                AirQualityReport {
                    collection: emergency_collection(request.zoom_level, reason),
                    tier: ResponseTier::Emergency,
                    enhancement,
                    fallback_reason: Some(reason),
                }
            }
        }
    }

    fn real_data(
        &self,
        request: &AirQualityRequest,
    ) -> std::result::Result<AirQualityReport, (PipelineError, EnhanceOutcome)> {
        let not_attempted = |e: PipelineError| (e, EnhanceOutcome::NotAttempted);

        let source = self
            .raster
            .as_ref()
            .ok_or_else(|| PipelineError::RasterUnavailable("no raster loaded".to_string()))
            .map_err(not_attempted)?;
        if !request.is_finite() {
            return Err(not_attempted(PipelineError::InvalidRequest(
                "non-finite coordinates".to_string(),
            )));
        }

        let tile = self
            .read_tile(source, request)
            .map_err(not_attempted)?;

        let decision = self
            .config
            .super_resolution
            .decide(request, self.enhancer.is_some());
        let (values, enhancement) = match (&self.enhancer, decision) {
            (Some(enhancer), GateDecision::Apply) => match enhancer.enhance(&tile) {
                Ok(values) => (Some(values), EnhanceOutcome::Applied),
                Err(e) => {
                    warn!(error = %e, "Super-resolution failed, using raw tile");
                    (None, EnhanceOutcome::Failed(e.kind()))
                }
            },
            _ => {
                debug!(decision = decision.as_str(), "Super-resolution not applied");
                (None, EnhanceOutcome::Skipped(decision))
            }
        };

        let sampler = FeatureSampler::new(&self.mapper, self.config.value_range);
        let features = sampler
            .sample(&tile, values.as_deref().unwrap_or(&tile.data), request.zoom_level)
            .map_err(|e| (PipelineError::from(e), enhancement))?;

        let used_model = enhancement == EnhanceOutcome::Applied;
        Ok(AirQualityReport {
            collection: FeatureCollection::new(
                features,
                ResponseMetadata::real(request.zoom_level, used_model),
            ),
            tier: if used_model {
                ResponseTier::Enhanced
            } else {
                ResponseTier::Raw
            },
            enhancement,
            fallback_reason: None,
        })
    }

    fn read_tile(
        &self,
        source: &GeoTiffSource,
        request: &AirQualityRequest,
    ) -> Result<geo_raster::RasterTile> {
        let window = PixelWindow::from_bbox(&self.mapper, request, source.width(), source.height())?;
        Ok(source.read_window(&window)?)
    }
}
