use std::fmt;
use thiserror::Error;

use crate::signing::SigningError;
use crate::validation::ContactValidationError;

/// The base error type shared by every Glowbook crate.
///
/// Feature crates keep their own error enums and provide
/// `From<CrateError> for GlowbookError` so handlers can fall back to the
/// uniform JSON error body.
#[derive(Error, Debug)]
pub enum GlowbookError {
    /// An outbound HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// A payload could not be parsed
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Authentication or authorization failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// User input was rejected
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A provider (scheduler, payment processor, mailing platform) rejected the call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Maps an error onto the HTTP status code returned to API callers.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for GlowbookError {
    fn status_code(&self) -> u16 {
        match self {
            GlowbookError::HttpError(_) => 502,
            GlowbookError::ParseError(_) => 400,
            GlowbookError::ConfigError(_) => 500,
            GlowbookError::AuthError(_) => 401,
            GlowbookError::ValidationError(_) => 400,
            GlowbookError::DatabaseError(_) => 500,
            GlowbookError::ExternalServiceError { .. } => 502,
            GlowbookError::ConflictError(_) => 409,
            GlowbookError::NotFoundError(_) => 404,
            GlowbookError::TimeoutError(_) => 504,
            GlowbookError::UnavailableError(_) => 503,
            GlowbookError::InternalError(_) => 500,
        }
    }
}

/// Adds context to foreign errors while converting them into [`GlowbookError`].
pub trait Context<T, E> {
    fn context<C>(self, context: C) -> Result<T, GlowbookError>
    where
        C: fmt::Display + Send + Sync + 'static;

    fn with_context<C, F>(self, f: F) -> Result<T, GlowbookError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, GlowbookError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| GlowbookError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, GlowbookError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| GlowbookError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<reqwest::Error> for GlowbookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GlowbookError::TimeoutError(err.to_string())
        } else {
            GlowbookError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GlowbookError {
    fn from(err: serde_json::Error) -> Self {
        GlowbookError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for GlowbookError {
    fn from(err: std::io::Error) -> Self {
        GlowbookError::InternalError(err.to_string())
    }
}

impl From<SigningError> for GlowbookError {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::InvalidSecret => GlowbookError::ConfigError(err.to_string()),
            SigningError::Encoding(_) => GlowbookError::InternalError(err.to_string()),
            _ => GlowbookError::AuthError(err.to_string()),
        }
    }
}

impl From<ContactValidationError> for GlowbookError {
    fn from(err: ContactValidationError) -> Self {
        GlowbookError::ValidationError(err.to_string())
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> GlowbookError {
    GlowbookError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> GlowbookError {
    GlowbookError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> GlowbookError {
    GlowbookError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> GlowbookError {
    GlowbookError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GlowbookError {
    GlowbookError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> GlowbookError {
    GlowbookError::InternalError(message.to_string())
}
