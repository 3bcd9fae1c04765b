// --- File: crates/glowbook_booking/src/lib.rs ---
//! Server side of the checkout: payment intent creation, booking token
//! issuance and token redemption against the scheduler.

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod redirect;
pub mod routes;
pub mod token;

#[cfg(test)]
mod handlers_test;

pub use error::BookingError;
pub use handlers::{BookingState, Discounts, Payments};
pub use logic::{
    CreateIntentRequest, CreateIntentResponse, CreateTokenRequest, CreateTokenResponse,
    DiscountCodes, RedeemRequest, RedeemResponse,
};
pub use redirect::verification_url;
pub use routes::{routes, routes_with};
pub use token::{issue_token, read_token, BookingClaims};
