// --- File: crates/glowbook_cal/src/error.rs ---
use glowbook_common::{external_service_error, GlowbookError, HttpStatusCode};
use thiserror::Error;

/// Cal.com-specific error types.
#[derive(Error, Debug)]
pub enum CalError {
    /// Error occurred during a Cal.com API request
    #[error("Cal.com API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Cal.com API
    #[error("Cal.com API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing a Cal.com API response
    #[error("Failed to parse Cal.com API response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Cal.com configuration missing or incomplete")]
    ConfigError,

    #[error("Reservation {0} not found")]
    ReservationNotFound(String),

    #[error("Reservation {0} has expired")]
    ReservationExpired(String),

    /// The slot was taken or is outside the bookable window
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),
}

impl From<CalError> for GlowbookError {
    fn from(err: CalError) -> Self {
        match err {
            CalError::RequestError(e) => {
                GlowbookError::HttpError(format!("Cal.com request error: {}", e))
            }
            CalError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Cal.com API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            CalError::ParseError(e) => {
                GlowbookError::ParseError(format!("Cal.com response parse error: {}", e))
            }
            CalError::ConfigError => GlowbookError::ConfigError(
                "Cal.com configuration missing or incomplete".to_string(),
            ),
            e @ CalError::ReservationNotFound(_) => GlowbookError::NotFoundError(e.to_string()),
            e @ CalError::ReservationExpired(_) => GlowbookError::ConflictError(e.to_string()),
            e @ CalError::SlotUnavailable(_) => GlowbookError::ConflictError(e.to_string()),
            CalError::InvalidRequest(msg) => GlowbookError::ValidationError(msg),
            e @ CalError::UnknownService(_) => GlowbookError::NotFoundError(e.to_string()),
        }
    }
}

impl HttpStatusCode for CalError {
    fn status_code(&self) -> u16 {
        match self {
            CalError::RequestError(_) => 502,
            CalError::ApiError { .. } => 502,
            CalError::ParseError(_) => 502,
            CalError::ConfigError => 500,
            CalError::ReservationNotFound(_) => 404,
            CalError::ReservationExpired(_) => 410,
            CalError::SlotUnavailable(_) => 409,
            CalError::InvalidRequest(_) => 400,
            CalError::UnknownService(_) => 404,
        }
    }
}
