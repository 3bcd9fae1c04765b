// --- File: crates/glowbook_booking/src/error.rs ---
use glowbook_cal::CalError;
use glowbook_common::{ContactValidationError, GlowbookError, HttpStatusCode, SigningError};
use glowbook_db::DbError;
use glowbook_hapio::HapioError;
use glowbook_stripe::StripeError;
use thiserror::Error;

const SUPPORT: &str = "Something went wrong on our side. Please contact support.";

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    InvalidContact(#[from] ContactValidationError),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// The service has no event type or no payable price
    #[error("Service {0} cannot be booked online")]
    NotBookable(String),

    /// The reservation expired or was released at the scheduler
    #[error("Reservation {0} is no longer held")]
    ReservationLost(String),

    #[error("Reservation does not match the selected slot")]
    ReservationMismatch,

    #[error("Discount code rejected: {0}")]
    DiscountRejected(String),

    #[error("Payment not completed (status {0})")]
    PaymentIncomplete(String),

    #[error("Paid amount does not match the booking")]
    AmountMismatch,

    /// The payment intent was created for another slot
    #[error("Payment does not belong to this booking")]
    PaymentMismatch,

    /// Another request holds the claim on this payment
    #[error("Booking for this payment is already being confirmed")]
    RedeemInProgress,

    #[error("Payment error: {0}")]
    Payment(#[from] StripeError),

    #[error("Booking token error: {0}")]
    Token(#[from] SigningError),

    #[error("Scheduling error: {0}")]
    Scheduler(#[from] CalError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] HapioError),

    #[error("Booking store error: {0}")]
    Store(#[from] DbError),

    #[error("Redirect URL could not be built: {0}")]
    Redirect(String),

    #[error("Booking configuration missing or incomplete: {0}")]
    ConfigError(String),

    #[error("Internal booking error: {0}")]
    Internal(String),

    #[error("{0} is disabled")]
    Disabled(String),
}

impl BookingError {
    /// Message shown to the client. Processor messages (card declines) are
    /// passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::InvalidRequest(msg) | BookingError::DiscountRejected(msg) => msg.clone(),
            BookingError::InvalidContact(e) => e.to_string(),
            BookingError::UnknownService(slug) => format!("Service '{}' not found.", slug),
            BookingError::NotBookable(_) => "This service cannot be booked online.".to_string(),
            BookingError::ReservationLost(_) => {
                "Your hold on this time has expired. Please pick a time again.".to_string()
            }
            BookingError::ReservationMismatch => {
                "Your reserved time does not match the selected time. Please pick a time again."
                    .to_string()
            }
            BookingError::PaymentIncomplete(_) => "Your payment has not completed.".to_string(),
            BookingError::AmountMismatch | BookingError::PaymentMismatch => {
                "We could not match your payment to this booking. Please contact support."
                    .to_string()
            }
            BookingError::RedeemInProgress => {
                "Your booking is already being confirmed. Please refresh in a moment.".to_string()
            }
            BookingError::Payment(StripeError::ApiError { message, .. }) => message.clone(),
            BookingError::Payment(StripeError::DepositNotAcknowledged) => {
                "Please confirm that the remaining balance is due at your appointment.".to_string()
            }
            BookingError::Payment(StripeError::InvalidPrice(_)) => {
                "This service cannot be paid online.".to_string()
            }
            BookingError::Payment(_) => {
                "The payment service is unavailable. Please try again.".to_string()
            }
            BookingError::Token(SigningError::Expired) => {
                "This booking link has expired. Please contact support.".to_string()
            }
            BookingError::Token(SigningError::InvalidSecret | SigningError::Encoding(_)) => {
                SUPPORT.to_string()
            }
            BookingError::Token(_) => {
                "This booking link is invalid. Please contact support.".to_string()
            }
            BookingError::Scheduler(CalError::SlotUnavailable(_)) => {
                "That time is no longer available. Your payment was received; please contact support."
                    .to_string()
            }
            BookingError::Scheduler(_) => {
                "We couldn't confirm your booking. Please contact support.".to_string()
            }
            BookingError::Catalog(_) => "Could not load services right now.".to_string(),
            BookingError::Store(_)
            | BookingError::Redirect(_)
            | BookingError::ConfigError(_)
            | BookingError::Internal(_) => SUPPORT.to_string(),
            BookingError::Disabled(what) => format!("{} is disabled.", what),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::InvalidRequest(_) => 400,
            BookingError::InvalidContact(_) => 400,
            BookingError::UnknownService(_) => 404,
            BookingError::NotBookable(_) => 422,
            BookingError::ReservationLost(_) => 410,
            BookingError::ReservationMismatch => 409,
            BookingError::DiscountRejected(_) => 400,
            BookingError::PaymentIncomplete(_) => 402,
            BookingError::AmountMismatch => 409,
            BookingError::PaymentMismatch => 409,
            BookingError::RedeemInProgress => 409,
            BookingError::Payment(StripeError::InvalidPrice(_)) => 422,
            BookingError::Payment(e) => e.status_code(),
            BookingError::Token(SigningError::Expired) => 410,
            BookingError::Token(SigningError::InvalidSecret | SigningError::Encoding(_)) => 500,
            BookingError::Token(_) => 401,
            BookingError::Scheduler(e) => e.status_code(),
            BookingError::Catalog(_) => 502,
            BookingError::Store(_) => 500,
            BookingError::Redirect(_) => 500,
            BookingError::ConfigError(_) => 500,
            BookingError::Internal(_) => 500,
            BookingError::Disabled(_) => 503,
        }
    }
}

impl From<BookingError> for GlowbookError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Payment(e) => e.into(),
            BookingError::Token(e) => e.into(),
            BookingError::Scheduler(e) => e.into(),
            BookingError::Catalog(e) => e.into(),
            BookingError::Store(e) => e.into(),
            BookingError::InvalidContact(e) => e.into(),
            e @ (BookingError::InvalidRequest(_)
            | BookingError::DiscountRejected(_)
            | BookingError::NotBookable(_)) => GlowbookError::ValidationError(e.to_string()),
            e @ BookingError::UnknownService(_) => GlowbookError::NotFoundError(e.to_string()),
            e @ (BookingError::ReservationLost(_)
            | BookingError::ReservationMismatch
            | BookingError::AmountMismatch
            | BookingError::PaymentMismatch
            | BookingError::RedeemInProgress) => GlowbookError::ConflictError(e.to_string()),
            e @ BookingError::PaymentIncomplete(_) => GlowbookError::ValidationError(e.to_string()),
            BookingError::ConfigError(msg) => GlowbookError::ConfigError(msg),
            e @ (BookingError::Redirect(_) | BookingError::Internal(_)) => {
                GlowbookError::InternalError(e.to_string())
            }
            BookingError::Disabled(what) => GlowbookError::UnavailableError(what),
        }
    }
}
