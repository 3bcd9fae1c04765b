// --- File: crates/glowbook_common/src/services.rs ---
//! Service abstractions for the external providers.
//!
//! Handlers hold these traits behind `Arc<dyn ...>` so tests can swap the
//! Cal.com, Stripe and Klaviyo clients for in-memory mocks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::models::{ContactDetails, Reservation, SlotSelection};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Slot reservations and bookings at the customer-facing scheduler.
pub trait SchedulingService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open slot start times for an event type between two calendar dates
    /// (inclusive), interpreted in `timezone`.
    fn available_slots(
        &self,
        event_type_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        timezone: &str,
        duration: Option<u32>,
    ) -> BoxFuture<'_, Vec<DateTime<Utc>>, Self::Error>;

    /// Place a temporary hold on a slot.
    fn reserve_slot(&self, slot: &SlotSelection) -> BoxFuture<'_, Reservation, Self::Error>;

    /// Fetch a reservation; used to verify a hold is still alive.
    fn get_reservation(&self, reservation_id: &str) -> BoxFuture<'_, Reservation, Self::Error>;

    /// Release a hold.
    fn release_reservation(&self, reservation_id: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Turn a paid slot into a real booking.
    fn create_booking(&self, request: BookingRequest) -> BoxFuture<'_, BookingResult, Self::Error>;

    fn cancel_booking(
        &self,
        booking_uid: &str,
        reason: Option<&str>,
    ) -> BoxFuture<'_, BookingResult, Self::Error>;

    fn reschedule_booking(
        &self,
        booking_uid: &str,
        new_start: DateTime<Utc>,
        reason: Option<&str>,
    ) -> BoxFuture<'_, BookingResult, Self::Error>;
}

/// Payment intents at the payment processor.
pub trait PaymentService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        description: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error>;

    fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error>;

    fn cancel_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error>;
}

/// Contact capture at the email marketing platform.
pub trait MarketingService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn subscribe(
        &self,
        contact: &ContactDetails,
        source: Option<&str>,
    ) -> BoxFuture<'_, (), Self::Error>;
}

/// Booking submitted to the scheduler once payment succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub event_type_id: i64,
    pub start_time: DateTime<Utc>,
    pub timezone: String,
    pub attendee: ContactDetails,
    pub reservation_id: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingResult {
    pub uid: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentIntentResult {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentResult {
    /// Funds are secured: captured, or authorized for manual capture.
    pub fn is_paid(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "requires_capture")
    }
}
