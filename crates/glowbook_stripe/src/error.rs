// --- File: crates/glowbook_stripe/src/error.rs ---
use glowbook_common::{external_service_error, GlowbookError, HttpStatusCode};
use glowbook_db::DbError;
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API; `message` is shown to the client verbatim
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration missing or incomplete")]
    ConfigError,

    /// Webhook signature verification failed
    #[error("Stripe webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// Webhook event processing error
    #[error("Stripe webhook event processing error: {0}")]
    WebhookProcessingError(String),

    /// A display price did not contain an amount
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Deposit requires acknowledgment of the balance due")]
    DepositNotAcknowledged,

    #[error("Booking store error: {0}")]
    StoreError(#[from] DbError),
}

/// Convert StripeError to GlowbookError
impl From<StripeError> for GlowbookError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => {
                GlowbookError::HttpError(format!("Stripe request error: {}", e))
            }
            StripeError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Stripe API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            StripeError::ParseError(e) => {
                GlowbookError::ParseError(format!("Stripe response parse error: {}", e))
            }
            StripeError::ConfigError => GlowbookError::ConfigError(
                "Stripe configuration missing or incomplete".to_string(),
            ),
            StripeError::WebhookSignatureError(msg) => {
                GlowbookError::AuthError(format!("Stripe webhook signature error: {}", msg))
            }
            StripeError::WebhookProcessingError(msg) => {
                external_service_error("Stripe webhook", msg)
            }
            StripeError::InvalidPrice(msg) => GlowbookError::ValidationError(msg),
            e @ StripeError::DepositNotAcknowledged => {
                GlowbookError::ValidationError(e.to_string())
            }
            StripeError::StoreError(e) => e.into(),
        }
    }
}

/// Implement HttpStatusCode for StripeError to provide a consistent way to convert
/// StripeError to HTTP status codes.
impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 502,
            // Card declines and invalid requests come back as 402/400
            StripeError::ApiError { status_code, .. } if (400..500).contains(status_code) => 402,
            StripeError::ApiError { .. } => 502,
            StripeError::ParseError(_) => 502,
            StripeError::ConfigError => 500,
            StripeError::WebhookSignatureError(_) => 400,
            StripeError::WebhookProcessingError(_) => 500,
            StripeError::InvalidPrice(_) => 400,
            StripeError::DepositNotAcknowledged => 400,
            StripeError::StoreError(_) => 500,
        }
    }
}
