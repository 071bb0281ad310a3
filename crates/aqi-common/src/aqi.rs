//! AQI scale, severity buckets and the color palette.

use serde::{Deserialize, Serialize};

/// Upper end of the AQI index.
pub const AQI_MAX: u16 = 500;

/// The six AQI severity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// All categories, from least to most severe.
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthySensitive,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Bucket an AQI value. Values above 300 are hazardous.
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthySensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    /// Hex color used on the map.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00E400",
            AqiCategory::Moderate => "#FFFF00",
            AqiCategory::UnhealthySensitive => "#FF7E00",
            AqiCategory::Unhealthy => "#FF0000",
            AqiCategory::VeryUnhealthy => "#99004C",
            AqiCategory::Hazardous => "#7E0023",
        }
    }

    /// Inclusive AQI range covered by this category.
    pub fn range(&self) -> (u16, u16) {
        match self {
            AqiCategory::Good => (0, 50),
            AqiCategory::Moderate => (51, 100),
            AqiCategory::UnhealthySensitive => (101, 150),
            AqiCategory::Unhealthy => (151, 200),
            AqiCategory::VeryUnhealthy => (201, 300),
            AqiCategory::Hazardous => (301, AQI_MAX),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Health advisory shown in the legend.
    pub fn advisory(&self) -> &'static str {
        match self {
            AqiCategory::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            AqiCategory::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people, \
                 particularly those who are unusually sensitive to air pollution."
            }
            AqiCategory::UnhealthySensitive => {
                "Members of sensitive groups may experience health effects. \
                 The general public is less likely to be affected."
            }
            AqiCategory::Unhealthy => {
                "Some members of the general public may experience health effects; \
                 members of sensitive groups may experience more serious health effects."
            }
            AqiCategory::VeryUnhealthy => {
                "Health alert: The risk of health effects is increased for everyone."
            }
            AqiCategory::Hazardous => {
                "Health warning of emergency conditions: everyone is more likely to be affected."
            }
        }
    }
}

/// Palette color for an AQI value.
pub fn color_for_aqi(aqi: u16) -> &'static str {
    AqiCategory::from_aqi(aqi).color()
}

/// Native value range of the raster band, mapped linearly onto 0..=500.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueRange {
    /// 8-bit rasters: 0..=255.
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 255.0,
        }
    }
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale a raw raster value to the AQI index, truncating and clamping
    /// into `0..=500`. Returns `None` for non-finite input or a degenerate
    /// range.
    pub fn to_aqi(&self, value: f64) -> Option<u16> {
        let span = self.max - self.min;
        if !value.is_finite() || !span.is_finite() || span == 0.0 {
            return None;
        }
        let scaled = ((value - self.min) * f64::from(AQI_MAX) / span).floor();
        Some(scaled.clamp(0.0, f64::from(AQI_MAX)) as u16)
    }
}

/// Clamp a floating AQI estimate into the index range, truncating toward zero.
pub fn clamp_aqi(value: f64) -> u16 {
    if value.is_nan() {
        return 0;
    }
    (value.trunc()).clamp(0.0, f64::from(AQI_MAX)) as u16
}
