//! Three-day forecast stub.
//!
//! No forecasting model exists yet; the values are fixed.

use serde::{Deserialize, Serialize};

use crate::aqi::color_for_aqi;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastEntry {
    pub day: String,
    pub aqi: u16,
    pub color: String,
}

impl ForecastEntry {
    fn new(day: &str, aqi: u16) -> Self {
        Self {
            day: day.to_string(),
            aqi,
            color: color_for_aqi(aqi).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastEntry>,
}

/// The static forecast: 120 today, 150 tomorrow, 180 on day 3.
pub fn static_forecast() -> ForecastResponse {
    ForecastResponse {
        forecast: vec![
            ForecastEntry::new("Today", 120),
            ForecastEntry::new("Tomorrow", 150),
            ForecastEntry::new("Day 3", 180),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_forecast() {
        let response = static_forecast();
        assert_eq!(response.forecast.len(), 3);
        assert_eq!(response.forecast[0].day, "Today");
        assert_eq!(response.forecast[0].color, "#FF7E00");
        assert_eq!(response.forecast[1].color, "#FF7E00");
        assert_eq!(response.forecast[2].aqi, 180);
        assert_eq!(response.forecast[2].color, "#FF0000");
    }
}
