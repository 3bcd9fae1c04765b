// --- File: crates/glowbook_cal/src/service.rs ---
//! Cal.com implementation of the scheduling service trait.

use chrono::{DateTime, NaiveDate, Utc};
use glowbook_common::services::{BookingRequest, BookingResult, BoxFuture, SchedulingService};
use glowbook_common::{Reservation, SlotSelection};

use crate::client::CalClient;
use crate::error::CalError;

impl SchedulingService for CalClient {
    type Error = CalError;

    fn available_slots(
        &self,
        event_type_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        timezone: &str,
        duration: Option<u32>,
    ) -> BoxFuture<'_, Vec<DateTime<Utc>>, Self::Error> {
        let timezone = timezone.to_string();
        Box::pin(async move {
            self.get_slots(event_type_id, start_date, end_date, &timezone, duration)
                .await
        })
    }

    fn reserve_slot(&self, slot: &SlotSelection) -> BoxFuture<'_, Reservation, Self::Error> {
        let slot = slot.clone();
        Box::pin(async move { self.reserve(&slot).await })
    }

    fn get_reservation(&self, reservation_id: &str) -> BoxFuture<'_, Reservation, Self::Error> {
        let reservation_id = reservation_id.to_string();
        Box::pin(async move { CalClient::get_reservation(self, &reservation_id).await })
    }

    fn release_reservation(&self, reservation_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let reservation_id = reservation_id.to_string();
        Box::pin(async move { self.delete_reservation(&reservation_id).await })
    }

    fn create_booking(&self, request: BookingRequest) -> BoxFuture<'_, BookingResult, Self::Error> {
        Box::pin(async move { CalClient::create_booking(self, &request).await })
    }

    fn cancel_booking(
        &self,
        booking_uid: &str,
        reason: Option<&str>,
    ) -> BoxFuture<'_, BookingResult, Self::Error> {
        let booking_uid = booking_uid.to_string();
        let reason = reason.map(str::to_string);
        Box::pin(async move {
            CalClient::cancel_booking(self, &booking_uid, reason.as_deref()).await
        })
    }

    fn reschedule_booking(
        &self,
        booking_uid: &str,
        new_start: DateTime<Utc>,
        reason: Option<&str>,
    ) -> BoxFuture<'_, BookingResult, Self::Error> {
        let booking_uid = booking_uid.to_string();
        let reason = reason.map(str::to_string);
        Box::pin(async move {
            CalClient::reschedule_booking(self, &booking_uid, new_start, reason.as_deref()).await
        })
    }
}
