// --- File: crates/glowbook_checkout/src/mock_api.rs ---
// In-memory studio API and card processor for the checkout tests.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use glowbook_booking::{
    CreateIntentRequest, CreateIntentResponse, CreateTokenRequest, CreateTokenResponse,
};
use glowbook_cal::{AvailabilityResponse, DaySlots, SlotOption};
use glowbook_common::services::BoxFuture;
use glowbook_common::{Reservation, SlotSelection};
use glowbook_stripe::pricing::{parse_price_cents, quote};
use glowbook_stripe::{DiscountValidation, ValidateDiscountRequest};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::api::{AvailabilityRequest, CardConfirmer, ConfirmedPayment, StudioApi};
use crate::error::CheckoutError;

pub(crate) fn slot_at(hour: u32) -> SlotSelection {
    SlotSelection {
        start_time: Utc.with_ymd_and_hms(2030, 7, 16, hour, 0, 0).unwrap(),
        event_type_id: 1203456,
        timezone: "America/Los_Angeles".into(),
        duration: 60,
        label: format!("Tue, Jul 16 · {}:00", hour),
    }
}

fn api_error(status_code: u16, message: &str) -> CheckoutError {
    CheckoutError::ApiError {
        status_code,
        message: message.to_string(),
    }
}

#[derive(Default)]
pub(crate) struct MockStudio {
    counter: AtomicU32,
    /// Reserve fails for slots starting at these times
    pub failing_starts: Mutex<HashSet<DateTime<Utc>>>,
    /// Delay before a reserve call answers
    pub reserve_delay: Mutex<Option<Duration>>,
    pub reject_verify: AtomicBool,
    reserved: Mutex<HashMap<String, SlotSelection>>,
    pub expires_at: Mutex<Option<DateTime<Utc>>>,
    /// Ordered log: `reserve:<slot key>`, `verify:<id>`, `release:<id>`
    pub events: Mutex<Vec<String>>,
    pub reserve_times: Mutex<Vec<Instant>>,
    pub intents: Mutex<Vec<CreateIntentRequest>>,
    pub tokens: Mutex<Vec<CreateTokenRequest>>,
    pub availability_calls: Mutex<Vec<AvailabilityRequest>>,
}

impl MockStudio {
    pub fn failing(starts: &[DateTime<Utc>]) -> Self {
        let mock = Self::default();
        mock.failing_starts.lock().unwrap().extend(starts.iter().copied());
        mock
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn releases(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("release:").map(str::to_string))
            .collect()
    }

    pub fn reserve_count(&self) -> usize {
        self.reserve_times.lock().unwrap().len()
    }

    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl StudioApi for MockStudio {
    fn availability(
        &self,
        request: &AvailabilityRequest,
    ) -> BoxFuture<'_, AvailabilityResponse, CheckoutError> {
        let request = request.clone();
        Box::pin(async move {
            self.availability_calls.lock().unwrap().push(request.clone());
            let start_date = NaiveDate::parse_from_str(&request.start, "%Y-%m-%d")
                .map_err(|_| api_error(400, "Invalid start format (YYYY-MM-DD)"))?;
            let slots_by_day = (0..request.days)
                .map(|offset| {
                    let date = start_date + ChronoDuration::days(i64::from(offset));
                    let start_time = Utc
                        .from_utc_datetime(&date.and_hms_opt(17, 0, 0).unwrap());
                    DaySlots {
                        date,
                        label: date.format("%a, %b %-d").to_string(),
                        slots: vec![SlotOption {
                            start_time,
                            label: "10:00 AM".into(),
                        }],
                    }
                })
                .collect();
            Ok(AvailabilityResponse {
                event_type_id: 1203456,
                timezone: "America/Los_Angeles".into(),
                start_date,
                days: request.days,
                duration_minutes: Some(60),
                slots_by_day,
            })
        })
    }

    fn reserve(&self, slot: &SlotSelection) -> BoxFuture<'_, Reservation, CheckoutError> {
        let slot = slot.clone();
        Box::pin(async move {
            self.reserve_times.lock().unwrap().push(Instant::now());
            self.log(format!("reserve:{}", slot.slot_key()));
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

            let delay = *self.reserve_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing_starts.lock().unwrap().contains(&slot.start_time) {
                return Err(api_error(409, "That time is no longer available."));
            }
            let id = format!("res-{}", n);
            self.reserved.lock().unwrap().insert(id.clone(), slot.clone());
            Ok(Reservation {
                id,
                expires_at: *self.expires_at.lock().unwrap(),
                start_time: slot.start_time,
                end_time: slot.start_time + ChronoDuration::minutes(i64::from(slot.duration)),
                timezone: slot.timezone.clone(),
                event_type_id: slot.event_type_id,
            })
        })
    }

    fn verify_reservation(
        &self,
        reservation_id: &str,
    ) -> BoxFuture<'_, Reservation, CheckoutError> {
        let id = reservation_id.to_string();
        Box::pin(async move {
            self.log(format!("verify:{}", id));
            if self.reject_verify.load(Ordering::SeqCst) {
                return Err(api_error(410, "Your hold on this time has expired."));
            }
            let slot = self
                .reserved
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| api_error(404, "Reservation not found."))?;
            Ok(Reservation {
                id,
                expires_at: *self.expires_at.lock().unwrap(),
                start_time: slot.start_time,
                end_time: slot.start_time + ChronoDuration::minutes(i64::from(slot.duration)),
                timezone: slot.timezone,
                event_type_id: slot.event_type_id,
            })
        })
    }

    fn release_reservation(&self, reservation_id: &str) -> BoxFuture<'_, (), CheckoutError> {
        let id = reservation_id.to_string();
        Box::pin(async move {
            self.log(format!("release:{}", id));
            Ok(())
        })
    }

    fn validate_discount(
        &self,
        request: &ValidateDiscountRequest,
    ) -> BoxFuture<'_, DiscountValidation, CheckoutError> {
        let request = request.clone();
        Box::pin(async move {
            if request.code.eq_ignore_ascii_case("GLOW20") {
                let discount_amount = request.amount / 5;
                Ok(DiscountValidation {
                    valid: true,
                    code: "GLOW20".into(),
                    discount_amount,
                    final_amount: request.amount - discount_amount,
                    message: None,
                })
            } else {
                Ok(DiscountValidation::invalid(
                    &request.code,
                    request.amount,
                    "This code is not valid.",
                ))
            }
        })
    }

    fn create_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> BoxFuture<'_, CreateIntentResponse, CheckoutError> {
        let request = request.clone();
        Box::pin(async move {
            self.intents.lock().unwrap().push(request.clone());
            let base = parse_price_cents("$120").unwrap();
            let discount = if request.discount_code.as_deref() == Some("GLOW20") {
                base / 5
            } else {
                0
            };
            let quote = quote(
                base,
                discount,
                request.payment_option,
                request.deposit_acknowledged,
            )
            .map_err(|e| api_error(400, &e.to_string()))?;
            Ok(CreateIntentResponse {
                payment_intent_id: "pi_123".into(),
                client_secret: "pi_123_secret_abc".into(),
                currency: "usd".into(),
                quote,
                discount_code: request.discount_code.clone(),
            })
        })
    }

    fn create_token(
        &self,
        request: &CreateTokenRequest,
    ) -> BoxFuture<'_, CreateTokenResponse, CheckoutError> {
        let request = request.clone();
        Box::pin(async move {
            self.tokens.lock().unwrap().push(request.clone());
            Ok(CreateTokenResponse {
                token: "signed.token".into(),
                expires_at: request.slot.start_time,
                redirect_url: format!(
                    "https://studio.example/verify?token=signed.token&payment_intent_id={}",
                    request.payment_intent_id
                ),
            })
        })
    }
}

/// Card processor answering with a fixed status, or declining.
pub(crate) struct MockCards {
    pub status: String,
    pub decline: Option<String>,
    pub confirmed: Mutex<Vec<(String, String)>>,
}

impl MockCards {
    pub fn succeeding() -> Self {
        Self {
            status: "succeeded".into(),
            decline: None,
            confirmed: Mutex::new(Vec::new()),
        }
    }

    pub fn declining(message: &str) -> Self {
        Self {
            decline: Some(message.to_string()),
            ..Self::succeeding()
        }
    }
}

impl CardConfirmer for MockCards {
    fn confirm_card(
        &self,
        payment_intent_id: &str,
        _client_secret: &str,
        payment_method: &str,
    ) -> BoxFuture<'_, ConfirmedPayment, CheckoutError> {
        let id = payment_intent_id.to_string();
        let method = payment_method.to_string();
        Box::pin(async move {
            self.confirmed.lock().unwrap().push((id.clone(), method));
            if let Some(message) = &self.decline {
                return Err(CheckoutError::CardDeclined(message.clone()));
            }
            Ok(ConfirmedPayment {
                id,
                status: self.status.clone(),
                amount: 0,
            })
        })
    }
}
