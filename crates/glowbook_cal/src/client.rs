// --- File: crates/glowbook_cal/src/client.rs ---
//! Cal.com API v2 calls.
//!
//! Slots and reservations use `cal-api-version: 2024-09-04`, bookings use
//! `2024-08-13`. Every response is wrapped in `{"status": "...", "data": ...}`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use glowbook_common::services::{BookingRequest, BookingResult};
use glowbook_common::{Reservation, SlotSelection, HTTP_CLIENT};
use glowbook_config::AppConfig;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::error::CalError;

pub const SLOTS_API_VERSION: &str = "2024-09-04";
pub const BOOKINGS_API_VERSION: &str = "2024-08-13";

#[derive(Deserialize, Debug)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CalSlot {
    pub start: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CalReservation {
    pub reservation_uid: String,
    pub event_type_id: i64,
    pub slot_start: String,
    pub slot_end: String,
    #[serde(default)]
    pub reservation_until: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CalBooking {
    pub uid: String,
    pub status: String,
    pub start: String,
    pub end: String,
}

/// Client for the customer-facing scheduler.
#[derive(Clone, Debug)]
pub struct CalClient {
    http: Client,
    base_url: String,
    api_key: String,
    reservation_minutes: u32,
    /// Studio timezone, used when the API does not echo one back
    timezone: String,
}

impl CalClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        reservation_minutes: u32,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            reservation_minutes,
            timezone: timezone.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CalError> {
        let cal = config.cal.as_ref().ok_or(CalError::ConfigError)?;
        if cal.api_key.is_empty() {
            return Err(CalError::ConfigError);
        }
        Ok(Self::new(
            &cal.api_base,
            &cal.api_key,
            cal.reservation_minutes,
            &config.studio.timezone,
        ))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        api_version: &str,
    ) -> Result<T, CalError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("cal-api-version", api_version)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body_text);
            error!("[Cal] API request failed: {} - {}", status, message);
            return Err(CalError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body_text)?;
        if envelope_ok(&envelope.status) {
            if let Some(data) = envelope.data {
                return Ok(data);
            }
        }
        Err(CalError::ApiError {
            status_code: status.as_u16(),
            message: envelope
                .error
                .as_ref()
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Cal.com returned no data")
                .to_string(),
        })
    }

    /// Open slot starts between two dates (inclusive) in `timezone`.
    pub async fn get_slots(
        &self,
        event_type_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        timezone: &str,
        duration: Option<u32>,
    ) -> Result<Vec<DateTime<Utc>>, CalError> {
        let mut query = vec![
            ("eventTypeId", event_type_id.to_string()),
            ("start", start_date.format("%Y-%m-%d").to_string()),
            ("end", end_date.format("%Y-%m-%d").to_string()),
            ("timeZone", timezone.to_string()),
        ];
        if let Some(minutes) = duration {
            query.push(("duration", minutes.to_string()));
        }
        debug!("[Cal] Fetching slots: {:?}", query);

        let by_day: HashMap<String, Vec<CalSlot>> = self
            .send(self.http.get(self.url("slots")).query(&query), SLOTS_API_VERSION)
            .await?;

        let mut slots = by_day
            .into_values()
            .flatten()
            .map(|slot| parse_time(&slot.start))
            .collect::<Result<Vec<_>, _>>()?;
        slots.sort();
        slots.dedup();
        Ok(slots)
    }

    pub async fn reserve(&self, slot: &SlotSelection) -> Result<Reservation, CalError> {
        let body = json!({
            "eventTypeId": slot.event_type_id,
            "slotStart": format_time(slot.start_time),
            "slotDuration": slot.duration,
            "reservationDuration": self.reservation_minutes,
        });
        info!(
            "[Cal] Reserving slot {} for event type {}",
            slot.start_time, slot.event_type_id
        );

        let result: Result<CalReservation, CalError> = self
            .send(
                self.http.post(self.url("slots/reservations")).json(&body),
                SLOTS_API_VERSION,
            )
            .await;

        match result {
            Ok(reservation) => to_reservation(reservation, &slot.timezone),
            // Cal.com answers 400/409/422 when the slot is already held or booked
            Err(CalError::ApiError {
                status_code,
                message,
            }) if matches!(status_code, 400 | 409 | 422) => Err(CalError::SlotUnavailable(message)),
            Err(e) => Err(e),
        }
    }

    pub async fn get_reservation(&self, reservation_id: &str) -> Result<Reservation, CalError> {
        let result: Result<CalReservation, CalError> = self
            .send(
                self.http
                    .get(self.url(&format!("slots/reservations/{}", reservation_id))),
                SLOTS_API_VERSION,
            )
            .await;
        match result {
            Ok(reservation) => to_reservation(reservation, &self.timezone),
            Err(CalError::ApiError {
                status_code: 404, ..
            }) => Err(CalError::ReservationNotFound(reservation_id.to_string())),
            Err(e) => Err(e),
        }
    }

    pub async fn delete_reservation(&self, reservation_id: &str) -> Result<(), CalError> {
        let response = self
            .http
            .delete(self.url(&format!("slots/reservations/{}", reservation_id)))
            .bearer_auth(&self.api_key)
            .header("cal-api-version", SLOTS_API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CalError::ReservationNotFound(reservation_id.to_string()));
        }
        if !status.is_success() {
            let message = error_message(&response.text().await?);
            return Err(CalError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }
        info!("[Cal] Released reservation {}", reservation_id);
        Ok(())
    }

    pub async fn create_booking(&self, request: &BookingRequest) -> Result<BookingResult, CalError> {
        let mut attendee = json!({
            "name": request.attendee.name,
            "email": request.attendee.email,
            "timeZone": request.timezone,
        });
        if let Some(phone) = &request.attendee.phone {
            attendee["phoneNumber"] = json!(phone);
        }

        let mut metadata = request.metadata.clone();
        if let Some(reservation_id) = &request.reservation_id {
            metadata
                .entry("reservation_id".to_string())
                .or_insert_with(|| reservation_id.clone());
        }

        let mut body = json!({
            "start": format_time(request.start_time),
            "eventTypeId": request.event_type_id,
            "attendee": attendee,
            "metadata": metadata,
        });
        if let Some(notes) = request.attendee.notes.as_deref().filter(|n| !n.is_empty()) {
            body["bookingFieldsResponses"] = json!({ "notes": notes });
        }

        let booking: CalBooking = self
            .send(
                self.http.post(self.url("bookings")).json(&body),
                BOOKINGS_API_VERSION,
            )
            .await?;
        info!("[Cal] Created booking {}", booking.uid);
        to_booking_result(booking)
    }

    pub async fn cancel_booking(
        &self,
        booking_uid: &str,
        reason: Option<&str>,
    ) -> Result<BookingResult, CalError> {
        let body = json!({
            "cancellationReason": reason.unwrap_or("Cancelled by studio"),
        });
        let booking: CalBooking = self
            .send(
                self.http
                    .post(self.url(&format!("bookings/{}/cancel", booking_uid)))
                    .json(&body),
                BOOKINGS_API_VERSION,
            )
            .await?;
        info!("[Cal] Cancelled booking {}", booking_uid);
        to_booking_result(booking)
    }

    /// Cal.com creates a new booking (new uid) and cancels the original.
    pub async fn reschedule_booking(
        &self,
        booking_uid: &str,
        new_start: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Result<BookingResult, CalError> {
        let mut body = json!({ "start": format_time(new_start) });
        if let Some(reason) = reason {
            body["reschedulingReason"] = json!(reason);
        }
        let booking: CalBooking = self
            .send(
                self.http
                    .post(self.url(&format!("bookings/{}/reschedule", booking_uid)))
                    .json(&body),
                BOOKINGS_API_VERSION,
            )
            .await?;
        info!("[Cal] Rescheduled booking {} -> {}", booking_uid, booking.uid);
        to_booking_result(booking)
    }
}

fn envelope_ok(status: &str) -> bool {
    status.eq_ignore_ascii_case("success")
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, CalError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CalError::ApiError {
            status_code: 502,
            message: format!("invalid timestamp '{}': {}", raw, e),
        })
}

fn to_reservation(raw: CalReservation, timezone: &str) -> Result<Reservation, CalError> {
    Ok(Reservation {
        id: raw.reservation_uid,
        expires_at: raw
            .reservation_until
            .as_deref()
            .map(parse_time)
            .transpose()?,
        start_time: parse_time(&raw.slot_start)?,
        end_time: parse_time(&raw.slot_end)?,
        timezone: timezone.to_string(),
        event_type_id: raw.event_type_id,
    })
}

fn to_booking_result(raw: CalBooking) -> Result<BookingResult, CalError> {
    Ok(BookingResult {
        start_time: parse_time(&raw.start)?,
        end_time: parse_time(&raw.end)?,
        uid: raw.uid,
        status: raw.status,
    })
}

/// Cal.com reports `{"status":"error","error":{"code":"...","message":"..."}}`.
fn error_message(body_text: &str) -> String {
    serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn times_are_sent_as_utc_seconds() {
        let t = Utc.with_ymd_and_hms(2025, 7, 15, 17, 0, 0).unwrap();
        assert_eq!(format_time(t), "2025-07-15T17:00:00Z");
    }

    #[test]
    fn offset_timestamps_are_normalized_to_utc() {
        let t = parse_time("2025-07-15T10:00:00.000-07:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 7, 15, 17, 0, 0).unwrap());
    }

    #[test]
    fn error_message_reads_nested_error() {
        let body = r#"{"status":"error","error":{"code":"BadRequestException","message":"slot taken"}}"#;
        assert_eq!(error_message(body), "slot taken");
        assert_eq!(error_message(r#"{"message":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(error_message("oops"), "oops");
    }
}
