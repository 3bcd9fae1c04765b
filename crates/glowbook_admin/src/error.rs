// --- File: crates/glowbook_admin/src/error.rs ---
use glowbook_cal::CalError;
use glowbook_common::{GlowbookError, HttpStatusCode, SigningError};
use glowbook_db::DbError;
use glowbook_hapio::HapioError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid admin password")]
    InvalidPassword,

    #[error("Admin session missing")]
    MissingSession,

    #[error("Admin session rejected: {0}")]
    InvalidSession(#[from] SigningError),

    /// A block's end is not after its start, or a field could not be read
    #[error("Invalid schedule block: {0}")]
    InvalidBlock(String),

    #[error("Schedule block overlaps {0}")]
    Overlap(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Booking {0} not found")]
    BookingNotFound(String),

    #[error("Booking {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("Hapio error: {0}")]
    Hapio(#[from] HapioError),

    #[error("Scheduling error: {0}")]
    Scheduler(#[from] CalError),

    #[error("Booking store error: {0}")]
    Store(#[from] DbError),

    #[error("Admin configuration missing or incomplete: {0}")]
    ConfigError(String),

    #[error("Admin area is disabled")]
    Disabled,
}

impl AdminError {
    /// Message returned to the admin UI.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::InvalidPassword => "Incorrect password.".to_string(),
            AdminError::MissingSession | AdminError::InvalidSession(SigningError::Expired) => {
                "Please sign in again.".to_string()
            }
            AdminError::InvalidSession(_) => "Invalid session. Please sign in again.".to_string(),
            AdminError::InvalidBlock(msg) | AdminError::InvalidRequest(msg) => msg.clone(),
            AdminError::Overlap(other) => format!("This time overlaps {}.", other),
            AdminError::BookingNotFound(_) => "Booking not found.".to_string(),
            AdminError::AlreadyCancelled(_) => "This booking is already cancelled.".to_string(),
            // Hapio validation messages are meant for the editor
            AdminError::Hapio(HapioError::ApiError { message, .. }) => message.clone(),
            AdminError::Hapio(_) => "The scheduling API is unavailable. Please try again.".to_string(),
            AdminError::Scheduler(CalError::ApiError { message, .. }) => message.clone(),
            AdminError::Scheduler(_) => "The calendar service is unavailable.".to_string(),
            AdminError::Store(_) | AdminError::ConfigError(_) => {
                "Server configuration error.".to_string()
            }
            AdminError::Disabled => "The admin area is disabled.".to_string(),
        }
    }
}

impl HttpStatusCode for AdminError {
    fn status_code(&self) -> u16 {
        match self {
            AdminError::InvalidPassword => 401,
            AdminError::MissingSession => 401,
            AdminError::InvalidSession(SigningError::InvalidSecret | SigningError::Encoding(_)) => {
                500
            }
            AdminError::InvalidSession(_) => 401,
            AdminError::InvalidBlock(_) => 422,
            AdminError::Overlap(_) => 409,
            AdminError::InvalidRequest(_) => 400,
            AdminError::BookingNotFound(_) => 404,
            AdminError::AlreadyCancelled(_) => 409,
            AdminError::Hapio(e) => e.status_code(),
            AdminError::Scheduler(e) => e.status_code(),
            AdminError::Store(_) => 500,
            AdminError::ConfigError(_) => 500,
            AdminError::Disabled => 503,
        }
    }
}

impl From<AdminError> for GlowbookError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Hapio(e) => e.into(),
            AdminError::Scheduler(e) => e.into(),
            AdminError::Store(e) => e.into(),
            AdminError::InvalidSession(e) => e.into(),
            e @ (AdminError::InvalidPassword | AdminError::MissingSession) => {
                GlowbookError::AuthError(e.to_string())
            }
            e @ (AdminError::InvalidBlock(_) | AdminError::InvalidRequest(_)) => {
                GlowbookError::ValidationError(e.to_string())
            }
            e @ (AdminError::Overlap(_) | AdminError::AlreadyCancelled(_)) => {
                GlowbookError::ConflictError(e.to_string())
            }
            e @ AdminError::BookingNotFound(_) => GlowbookError::NotFoundError(e.to_string()),
            AdminError::ConfigError(msg) => GlowbookError::ConfigError(msg),
            AdminError::Disabled => GlowbookError::UnavailableError("Admin area".to_string()),
        }
    }
}
