// --- File: crates/glowbook_mailing/src/error.rs ---
use glowbook_common::{external_service_error, GlowbookError, HttpStatusCode};
use thiserror::Error;

/// Mailing-platform error types.
#[derive(Error, Debug)]
pub enum MailingError {
    #[error("Klaviyo API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Klaviyo API
    #[error("Klaviyo API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Mailing configuration missing or incomplete")]
    ConfigError,
}

impl From<MailingError> for GlowbookError {
    fn from(err: MailingError) -> Self {
        match err {
            MailingError::RequestError(e) => {
                GlowbookError::HttpError(format!("Klaviyo request error: {}", e))
            }
            MailingError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Klaviyo API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            MailingError::ConfigError => GlowbookError::ConfigError(
                "Mailing configuration missing or incomplete".to_string(),
            ),
        }
    }
}

impl HttpStatusCode for MailingError {
    fn status_code(&self) -> u16 {
        match self {
            MailingError::RequestError(_) => 502,
            MailingError::ApiError { .. } => 502,
            MailingError::ConfigError => 500,
        }
    }
}
