// --- File: crates/glowbook_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Models shared by the booking flow
pub mod services; // Service abstractions
pub mod signing; // HMAC signed tokens
pub mod validation; // Contact validation


// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, external_service_error, internal_error, not_found, validation_error,
    Context, GlowbookError, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, HTTP_CLIENT},
    handle_json_result, map_json_error, IntoHttpResponse,
};

pub use logging::{init, init_with_file, init_with_level, log_result};

pub use models::{ContactDetails, Reservation, SlotSelection};
pub use signing::{sign_claims, verify_claims, SigningError};
pub use validation::{is_valid_email, normalize_phone, validate_contact, ContactValidationError};
