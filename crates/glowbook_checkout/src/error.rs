// --- File: crates/glowbook_checkout/src/error.rs ---
use glowbook_common::{external_service_error, ContactValidationError, GlowbookError, HttpStatusCode};
use thiserror::Error;

/// Errors raised while a client walks through checkout.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Studio API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-success answer from the studio API; `message` is the text the
    /// handler meant for the client.
    #[error("Studio API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidContact(#[from] ContactValidationError),

    #[error("No verified reservation for the selected slot")]
    ReservationRequired,

    #[error("Deposit selected without acknowledging the balance")]
    DepositNotAcknowledged,

    #[error("Discount code rejected: {0}")]
    DiscountRejected(String),

    #[error("Price is not payable online: {0}")]
    InvalidPrice(String),

    /// Decline text from the card processor, shown as is
    #[error("Card payment failed: {0}")]
    CardDeclined(String),

    #[error("Payment ended in status {0}")]
    PaymentIncomplete(String),

    #[error("Checkout configuration error: {0}")]
    ConfigError(String),
}

impl CheckoutError {
    /// Text shown inline next to the form.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::ApiError { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            CheckoutError::InvalidContact(e) => e.to_string(),
            CheckoutError::ReservationRequired => {
                "Your selected time is no longer held. Please pick a time again.".to_string()
            }
            CheckoutError::DepositNotAcknowledged => {
                "Please confirm that the remaining balance is due at your appointment.".to_string()
            }
            CheckoutError::DiscountRejected(message) | CheckoutError::CardDeclined(message) => {
                message.clone()
            }
            CheckoutError::InvalidPrice(_) => "This service cannot be paid online.".to_string(),
            CheckoutError::PaymentIncomplete(_) => {
                "Your payment could not be completed. Please try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<CheckoutError> for GlowbookError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::RequestError(e) => {
                GlowbookError::HttpError(format!("Studio API request error: {}", e))
            }
            CheckoutError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Studio API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            CheckoutError::ParseError(e) => GlowbookError::ParseError(e.to_string()),
            CheckoutError::InvalidContact(e) => GlowbookError::ValidationError(e.to_string()),
            CheckoutError::ReservationRequired => {
                GlowbookError::ConflictError(CheckoutError::ReservationRequired.to_string())
            }
            CheckoutError::DepositNotAcknowledged
            | CheckoutError::DiscountRejected(_)
            | CheckoutError::InvalidPrice(_) => GlowbookError::ValidationError(err.to_string()),
            CheckoutError::CardDeclined(msg) | CheckoutError::PaymentIncomplete(msg) => {
                external_service_error("Stripe", msg)
            }
            CheckoutError::ConfigError(msg) => GlowbookError::ConfigError(msg),
        }
    }
}

impl HttpStatusCode for CheckoutError {
    fn status_code(&self) -> u16 {
        match self {
            CheckoutError::RequestError(_) => 502,
            CheckoutError::ApiError { status_code, .. } => *status_code,
            CheckoutError::ParseError(_) => 502,
            CheckoutError::InvalidContact(_)
            | CheckoutError::DepositNotAcknowledged
            | CheckoutError::DiscountRejected(_)
            | CheckoutError::InvalidPrice(_) => 400,
            CheckoutError::ReservationRequired => 409,
            CheckoutError::CardDeclined(_) | CheckoutError::PaymentIncomplete(_) => 402,
            CheckoutError::ConfigError(_) => 500,
        }
    }
}
