//! Prometheus metrics for the AQI API.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

use aqi_pipeline::AirQualityReport;

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!("aqi_requests_total", "Air quality requests served, by tier");
    describe_counter!(
        "aqi_invalid_requests_total",
        "Air quality requests rejected with 400"
    );
    describe_counter!(
        "aqi_fallback_total",
        "Requests that fell back from real data, by reason"
    );
    describe_counter!(
        "aqi_super_resolution_total",
        "Super-resolution outcomes per request"
    );
    describe_histogram!("aqi_features_returned", "Features per response");
    describe_histogram!(
        "aqi_request_duration_seconds",
        "Time to answer an air quality request"
    );
}

/// Record a served request.
pub fn record_report(report: &AirQualityReport, elapsed: Duration) {
    counter!("aqi_requests_total", "tier" => report.tier.as_str()).increment(1);
    counter!("aqi_super_resolution_total", "outcome" => report.enhancement.as_str()).increment(1);
    if let Some(reason) = report.fallback_reason {
        counter!("aqi_fallback_total", "reason" => reason).increment(1);
    }
    histogram!("aqi_features_returned").record(report.collection.len() as f64);
    histogram!("aqi_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_invalid_request() {
    counter!("aqi_invalid_requests_total").increment(1);
}
