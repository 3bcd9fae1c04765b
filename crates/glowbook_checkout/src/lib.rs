// --- File: crates/glowbook_checkout/src/lib.rs ---
//! Session side of the booking checkout: the slot hold, the payment
//! submission and the availability panel, talking to the studio API.

pub mod api;
pub mod error;
pub mod flow;
pub mod hold;
pub mod panel;

#[cfg(test)]
mod hold_test;
#[cfg(test)]
mod mock_api;

pub use api::{
    AvailabilityRequest, CardConfirmer, ConfirmedPayment, HttpStudioApi, StripeCardConfirmer,
    StudioApi,
};
pub use error::CheckoutError;
pub use flow::{AppliedDiscount, Checkout, CheckoutForm, CheckoutOutcome};
pub use hold::{HoldSnapshot, HoldStatus, ReservationHold};
pub use panel::{studio_today, window_days, AvailabilityPanel};
