//! Error types for the AQI map service.

use thiserror::Error;

/// Result type alias using AqiError.
pub type AqiResult<T> = Result<T, AqiError>;

/// Errors surfaced at the service boundary.
///
/// Data-side failures never reach the client as errors (they degrade to
/// synthetic data), so every variant here is a rejected request.
#[derive(Debug, Error)]
pub enum AqiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl AqiError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AqiError::InvalidRequest(_) | AqiError::InvalidParameter { .. } => 400,
        }
    }

    /// Message returned in the `error` member of the JSON body.
    ///
    /// Validation failures share one message, which the web client matches on;
    /// the detail stays in the `Display` output for logs.
    pub fn client_message(&self) -> &'static str {
        "Invalid bounds parameters"
    }
}

impl From<serde_json::Error> for AqiError {
    fn from(err: serde_json::Error) -> Self {
        AqiError::InvalidRequest(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AqiError::InvalidRequest("x".into()).http_status_code(), 400);
        assert_eq!(
            AqiError::InvalidParameter {
                param: "zoom_level".into(),
                message: "nan".into()
            }
            .http_status_code(),
            400
        );
    }

    #[test]
    fn test_client_message() {
        let err = AqiError::InvalidParameter {
            param: "lat_min".into(),
            message: "expected a number".into(),
        };
        assert_eq!(err.client_message(), "Invalid bounds parameters");
        assert!(err.to_string().contains("lat_min"));

        let err: AqiError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "Invalid bounds parameters");
        assert!(err.to_string().starts_with("Invalid request: JSON error"));
    }
}
