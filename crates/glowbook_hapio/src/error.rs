// --- File: crates/glowbook_hapio/src/error.rs ---
use glowbook_common::{external_service_error, GlowbookError, HttpStatusCode};
use thiserror::Error;

/// Hapio-specific error types.
#[derive(Error, Debug)]
pub enum HapioError {
    /// Error occurred during a Hapio API request
    #[error("Hapio API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Hapio API
    #[error("Hapio API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing a Hapio API response
    #[error("Failed to parse Hapio API response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Hapio configuration missing or incomplete")]
    ConfigError,

    #[error("Not found: {0}")]
    NotFound(String),

    /// An ISO 8601 duration Hapio sent could not be read
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

impl From<HapioError> for GlowbookError {
    fn from(err: HapioError) -> Self {
        match err {
            HapioError::RequestError(e) => {
                GlowbookError::HttpError(format!("Hapio request error: {}", e))
            }
            HapioError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Hapio API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            HapioError::ParseError(e) => {
                GlowbookError::ParseError(format!("Hapio response parse error: {}", e))
            }
            HapioError::ConfigError => {
                GlowbookError::ConfigError("Hapio configuration missing or incomplete".to_string())
            }
            HapioError::NotFound(what) => GlowbookError::NotFoundError(what),
            HapioError::InvalidDuration(msg) => GlowbookError::ParseError(msg),
        }
    }
}

impl HttpStatusCode for HapioError {
    fn status_code(&self) -> u16 {
        match self {
            HapioError::RequestError(_) => 502,
            // Validation failures from Hapio are passed straight through
            HapioError::ApiError { status_code, .. } if *status_code == 404 => 404,
            HapioError::ApiError { status_code, .. } if *status_code == 422 => 422,
            HapioError::ApiError { .. } => 502,
            HapioError::ParseError(_) => 502,
            HapioError::ConfigError => 500,
            HapioError::NotFound(_) => 404,
            HapioError::InvalidDuration(_) => 502,
        }
    }
}
