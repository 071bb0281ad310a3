//! Common types shared across the AQI map workspace.

pub mod aqi;
pub mod bbox;
pub mod error;
pub mod forecast;
pub mod geojson;

pub use aqi::{clamp_aqi, color_for_aqi, AqiCategory, ValueRange, AQI_MAX};
pub use bbox::{AirQualityRequest, GeoBounds, DEFAULT_BOUNDS};
pub use error::{AqiError, AqiResult};
pub use forecast::{static_forecast, ForecastEntry, ForecastResponse};
pub use geojson::{AqiFeature, AqiProperties, FeatureCollection, PointGeometry, ResponseMetadata};
