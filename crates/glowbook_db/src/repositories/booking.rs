//! Repository for bookings
//!
//! A booking row is written once a signed booking token is redeemed, then
//! mutated by cancel/reschedule and by payment webhooks.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    DepositPaid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::DepositPaid => "deposit_paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "deposit_paid" => Ok(PaymentStatus::DepositPaid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(DbError::DecodeError(format!("unknown payment status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Payment claimed for redemption; the scheduler booking is not confirmed yet
    Pending,
    Confirmed,
    Rescheduled,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rescheduled => "rescheduled",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rescheduled" => Ok(BookingStatus::Rescheduled),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(DbError::DecodeError(format!("unknown booking status '{other}'"))),
        }
    }
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub service_name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub external_booking_uid: Option<String>,
    pub status: BookingStatus,
    /// Amount collected so far, in the smallest currency unit
    pub amount_paid: i64,
    pub currency: String,
    pub metadata: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields supplied when a booking is first recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub service_id: String,
    pub service_name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub external_booking_uid: Option<String>,
    pub amount_paid: i64,
    pub currency: String,
    pub metadata: serde_json::Value,
}

/// Storage operations for bookings.
pub trait BookingRepository {
    /// Creates the `bookings` table if it does not exist yet.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Inserts a booking. Payment intent ids are unique, so redeeming the
    /// same payment twice fails instead of creating a duplicate.
    fn create(
        &self,
        booking: NewBooking,
    ) -> impl std::future::Future<Output = Result<Booking, DbError>> + Send;

    /// Inserts a `Pending` booking that reserves its payment intent for one
    /// redemption. `None` when another row already holds the payment intent.
    fn claim(
        &self,
        booking: NewBooking,
    ) -> impl std::future::Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// Turns the pending claim for `payment_intent_id` into a confirmed
    /// booking; `None` when there is no pending claim.
    fn confirm_claim(
        &self,
        payment_intent_id: &str,
        external_booking_uid: &str,
        booking_date: DateTime<Utc>,
        metadata: serde_json::Value,
    ) -> impl std::future::Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// Drops a pending claim so the payment can be redeemed again. Returns
    /// `true` when a claim was removed.
    fn release_claim(
        &self,
        payment_intent_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Booking>, DbError>> + Send;

    fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// Most recent appointments first.
    fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Booking>, DbError>> + Send;

    /// Marks a booking cancelled; `None` when the id is unknown.
    fn cancel(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// Moves a booking to a new date and external uid; `None` when the id is unknown.
    fn reschedule(
        &self,
        id: &str,
        new_date: DateTime<Utc>,
        external_booking_uid: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// Returns `true` when a booking with this payment intent was updated.
    fn update_payment_status(
        &self,
        payment_intent_id: &str,
        status: PaymentStatus,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
