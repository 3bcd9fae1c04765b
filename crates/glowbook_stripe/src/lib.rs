// --- File: crates/glowbook_stripe/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod pricing;
pub mod routes;
pub mod service;
pub mod webhook;

#[cfg(test)]
mod pricing_test;

// Re-export for main backend
pub use error::StripeError;
pub use handlers::StripeState;
pub use logic::{DiscountValidation, PaymentIntent, ValidateDiscountRequest};
pub use pricing::{PaymentOption, PriceQuote};
pub use routes::routes;
pub use service::StripePaymentService;
