// --- File: crates/glowbook_booking/src/handlers_test.rs ---
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use glowbook_cal::{CalError, Scheduler};
use glowbook_common::services::{
    BookingRequest, BookingResult, BoxFuture, PaymentIntentResult, PaymentService,
    SchedulingService,
};
use glowbook_common::{ContactDetails, Reservation, SlotSelection};
use glowbook_config::{AppConfig, BookingConfig};
use glowbook_db::{
    BookingRepository, BookingStatus, DbClient, PaymentStatus, SqlBookingRepository,
};
use glowbook_hapio::{HapioError, Service, ServiceCatalog};
use glowbook_stripe::{DiscountValidation, PaymentOption, StripeError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::handlers::{BookingState, Discounts, Payments};
use crate::logic::{CreateIntentResponse, CreateTokenResponse, DiscountCodes, RedeemResponse};
use crate::routes::routes_with;
use crate::token::{issue_token, read_token, BookingClaims};

const EVENT_TYPE_ID: i64 = 1203456;

fn slot_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 7, 16, 17, 0, 0).unwrap()
}

fn slot() -> SlotSelection {
    SlotSelection {
        start_time: slot_start(),
        event_type_id: EVENT_TYPE_ID,
        timezone: "America/Los_Angeles".into(),
        duration: 60,
        label: "Tue, Jul 16 · 10:00 AM".into(),
    }
}

fn reservation_for(start: DateTime<Utc>) -> Reservation {
    Reservation {
        id: "res-1".into(),
        expires_at: Some(Utc::now() + Duration::minutes(2)),
        start_time: start,
        end_time: start + Duration::hours(1),
        timezone: "America/Los_Angeles".into(),
        event_type_id: EVENT_TYPE_ID,
    }
}

// --- Mocks ---

#[derive(Default)]
struct MockScheduler {
    reservation: Option<Reservation>,
    bookings: Mutex<Vec<BookingRequest>>,
    slot_taken: bool,
}

impl MockScheduler {
    fn holding(reservation: Reservation) -> Self {
        Self {
            reservation: Some(reservation),
            ..Default::default()
        }
    }

    fn booking_count(&self) -> usize {
        self.bookings.lock().unwrap().len()
    }
}

impl SchedulingService for MockScheduler {
    type Error = CalError;

    fn available_slots(
        &self,
        _event_type_id: i64,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
        _timezone: &str,
        _duration: Option<u32>,
    ) -> BoxFuture<'_, Vec<DateTime<Utc>>, Self::Error> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn reserve_slot(&self, _slot: &SlotSelection) -> BoxFuture<'_, Reservation, Self::Error> {
        Box::pin(async { Err(CalError::InvalidRequest("not used".into())) })
    }

    fn get_reservation(&self, reservation_id: &str) -> BoxFuture<'_, Reservation, Self::Error> {
        let result = self
            .reservation
            .clone()
            .filter(|r| r.id == reservation_id)
            .ok_or_else(|| CalError::ReservationNotFound(reservation_id.to_string()));
        Box::pin(async move { result })
    }

    fn release_reservation(&self, _reservation_id: &str) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async { Ok(()) })
    }

    fn create_booking(&self, request: BookingRequest) -> BoxFuture<'_, BookingResult, Self::Error> {
        if self.slot_taken {
            return Box::pin(async { Err(CalError::SlotUnavailable("taken".into())) });
        }
        let result = BookingResult {
            uid: "bk_1".into(),
            status: "accepted".into(),
            start_time: request.start_time,
            end_time: request.start_time + Duration::hours(1),
        };
        self.bookings.lock().unwrap().push(request);
        Box::pin(async move { Ok(result) })
    }

    fn cancel_booking(
        &self,
        _booking_uid: &str,
        _reason: Option<&str>,
    ) -> BoxFuture<'_, BookingResult, Self::Error> {
        Box::pin(async { Err(CalError::InvalidRequest("not used".into())) })
    }

    fn reschedule_booking(
        &self,
        _booking_uid: &str,
        _new_start: DateTime<Utc>,
        _reason: Option<&str>,
    ) -> BoxFuture<'_, BookingResult, Self::Error> {
        Box::pin(async { Err(CalError::InvalidRequest("not used".into())) })
    }
}

#[derive(Default)]
struct MockPayments {
    created: Mutex<Vec<(i64, HashMap<String, String>)>>,
    retrieved: Option<PaymentIntentResult>,
}

impl MockPayments {
    fn created(&self) -> Vec<(i64, HashMap<String, String>)> {
        self.created.lock().unwrap().clone()
    }
}

impl PaymentService for MockPayments {
    type Error = StripeError;

    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        _description: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error> {
        self.created.lock().unwrap().push((amount, metadata.clone()));
        let intent = PaymentIntentResult {
            id: "pi_test".into(),
            status: "requires_payment_method".into(),
            amount,
            currency: currency.to_string(),
            client_secret: Some("pi_test_secret".into()),
            metadata,
        };
        Box::pin(async move { Ok(intent) })
    }

    fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error> {
        let result = self
            .retrieved
            .clone()
            .filter(|pi| pi.id == payment_intent_id)
            .ok_or_else(|| StripeError::ApiError {
                status_code: 404,
                message: "No such payment_intent".into(),
            });
        Box::pin(async move { result })
    }

    fn cancel_payment_intent(
        &self,
        _payment_intent_id: &str,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error> {
        Box::pin(async { Err(StripeError::ConfigError) })
    }
}

/// Knows one code, GLOW20, worth 20%.
struct MockDiscounts;

impl DiscountCodes for MockDiscounts {
    fn validate<'a>(
        &'a self,
        code: &'a str,
        amount: i64,
        _currency: &'a str,
    ) -> BoxFuture<'a, DiscountValidation, StripeError> {
        let result = if code == "GLOW20" {
            DiscountValidation {
                valid: true,
                code: code.to_string(),
                discount_amount: amount / 5,
                final_amount: amount - amount / 5,
                message: None,
            }
        } else {
            DiscountValidation::invalid(code, amount, "This discount code is invalid or has expired.")
        };
        Box::pin(async move { Ok(result) })
    }
}

struct MockCatalog;

impl ServiceCatalog for MockCatalog {
    fn list_services(&self) -> BoxFuture<'_, Vec<Service>, HapioError> {
        Box::pin(async { Ok(vec![signature_facial()]) })
    }

    fn find_service<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Option<Service>, HapioError> {
        let found = (slug == "signature-facial").then(signature_facial);
        Box::pin(async move { Ok(found) })
    }
}

fn signature_facial() -> Service {
    Service {
        id: "svc_1".into(),
        name: "Signature Facial".into(),
        slug: "signature-facial".into(),
        category: "Facials".into(),
        summary: String::new(),
        description: String::new(),
        duration_minutes: 60,
        price: "$120".into(),
        featured: true,
        best_seller: false,
        calendar_link: None,
        event_type_id: Some(EVENT_TYPE_ID),
    }
}

// --- Harness ---

fn booking_config() -> BookingConfig {
    BookingConfig {
        token_secret: "booking-test-secret".into(),
        token_ttl_minutes: 30,
        verify_url: "https://studio.example/booking/verify".into(),
    }
}

fn state(
    scheduler: &Arc<MockScheduler>,
    payments: &Arc<MockPayments>,
    bookings: Option<SqlBookingRepository>,
) -> BookingState {
    let scheduler: Scheduler = scheduler.clone();
    let payments: Payments = payments.clone();
    let discounts: Discounts = Arc::new(MockDiscounts);
    BookingState {
        config: Arc::new(AppConfig {
            use_booking: true,
            booking: Some(booking_config()),
            ..Default::default()
        }),
        scheduler: Some(scheduler),
        payments: Some(payments),
        discounts: Some(discounts),
        catalog: Some(Arc::new(MockCatalog)),
        bookings,
    }
}

async fn post_json(state: BookingState, uri: &str, body: Value) -> (StatusCode, Bytes) {
    let response = routes_with(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, to_bytes(response.into_body(), usize::MAX).await.unwrap())
}

fn contact_json() -> Value {
    json!({ "name": "Dana Reyes", "email": "dana@example.com", "phone": "415-555-0134" })
}

fn intent_request(extra: Value) -> Value {
    let mut body = json!({
        "service_slug": "signature-facial",
        "slot": slot(),
        "reservation_id": "res-1",
        "contact": contact_json(),
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    body
}

// --- create-intent ---

#[tokio::test]
async fn intent_amount_is_discounted_then_halved_for_deposit() {
    let scheduler = Arc::new(MockScheduler::holding(reservation_for(slot_start())));
    let payments = Arc::new(MockPayments::default());

    let (status, body) = post_json(
        state(&scheduler, &payments, None),
        "/payments/create-intent",
        intent_request(json!({
            "discount_code": " GLOW20 ",
            "payment_option": "deposit",
            "deposit_acknowledged": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{:?}", body);
    let response: CreateIntentResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.client_secret, "pi_test_secret");
    assert_eq!(response.quote.base_amount, 12000);
    assert_eq!(response.quote.discount_amount, 2400);
    assert_eq!(response.quote.total_amount, 9600);
    assert_eq!(response.quote.amount_due, 4800);
    assert_eq!(response.discount_code.as_deref(), Some("GLOW20"));

    let created = payments.created();
    assert_eq!(created.len(), 1);
    let (amount, metadata) = &created[0];
    assert_eq!(*amount, 4800);
    assert_eq!(metadata["reservation_id"], "res-1");
    assert_eq!(metadata["payment_option"], "deposit");
    assert_eq!(metadata["slot_start"], slot_start().to_rfc3339());
}

#[tokio::test]
async fn mismatched_reservation_blocks_intent() {
    let other_start = slot_start() + Duration::minutes(30);
    let scheduler = Arc::new(MockScheduler::holding(reservation_for(other_start)));
    let payments = Arc::new(MockPayments::default());

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/payments/create-intent",
        intent_request(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(payments.created().is_empty());
}

#[tokio::test]
async fn lost_reservation_blocks_intent() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());

    let (status, body) = post_json(
        state(&scheduler, &payments, None),
        "/payments/create-intent",
        intent_request(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::GONE);
    assert_eq!(
        &body[..],
        b"Your hold on this time has expired. Please pick a time again."
    );
    assert!(payments.created().is_empty());
}

#[tokio::test]
async fn deposit_needs_acknowledgment() {
    let scheduler = Arc::new(MockScheduler::holding(reservation_for(slot_start())));
    let payments = Arc::new(MockPayments::default());

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/payments/create-intent",
        intent_request(json!({ "payment_option": "deposit" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payments.created().is_empty());
}

#[tokio::test]
async fn invalid_discount_is_reported() {
    let scheduler = Arc::new(MockScheduler::holding(reservation_for(slot_start())));
    let payments = Arc::new(MockPayments::default());

    let (status, body) = post_json(
        state(&scheduler, &payments, None),
        "/payments/create-intent",
        intent_request(json!({ "discount_code": "NOPE" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"This discount code is invalid or has expired.");
    assert!(payments.created().is_empty());
}

#[tokio::test]
async fn invalid_contact_is_rejected_first() {
    let scheduler = Arc::new(MockScheduler::holding(reservation_for(slot_start())));
    let payments = Arc::new(MockPayments::default());

    let (status, body) = post_json(
        state(&scheduler, &payments, None),
        "/payments/create-intent",
        intent_request(json!({ "contact": { "name": "", "email": "dana@example.com" } })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"Please enter your name.");
}

// --- create-token ---

fn paid_intent(status: &str, amount: i64) -> PaymentIntentResult {
    PaymentIntentResult {
        id: "pi_paid".into(),
        status: status.into(),
        amount,
        currency: "usd".into(),
        client_secret: None,
        metadata: HashMap::from([
            ("event_type_id".to_string(), EVENT_TYPE_ID.to_string()),
            ("slot_start".to_string(), slot_start().to_rfc3339()),
            ("timezone".to_string(), "America/Los_Angeles".to_string()),
            ("reservation_id".to_string(), "res-1".to_string()),
            ("service_id".to_string(), "svc_1".to_string()),
            ("service_name".to_string(), "Signature Facial".to_string()),
            ("payment_option".to_string(), "deposit".to_string()),
            ("name".to_string(), "Dana Reyes".to_string()),
            ("email".to_string(), "dana@example.com".to_string()),
        ]),
    }
}

fn token_request(amount: i64) -> Value {
    json!({
        "payment_intent_id": "pi_paid",
        "slot": slot(),
        "reservation_id": "res-1",
        "contact": contact_json(),
        "amount": amount
    })
}

#[tokio::test]
async fn succeeded_payment_gets_a_signed_token() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments {
        retrieved: Some(paid_intent("succeeded", 6000)),
        ..Default::default()
    });

    let (status, body) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create-token",
        token_request(6000),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{:?}", body);
    let response: CreateTokenResponse = serde_json::from_slice(&body).unwrap();
    assert!(response
        .redirect_url
        .starts_with("https://studio.example/booking/verify?token="));
    assert!(response.redirect_url.contains("payment_intent_id=pi_paid"));

    let claims = read_token(&booking_config(), &response.token).unwrap();
    assert_eq!(claims.payment_intent_id, "pi_paid");
    assert_eq!(claims.payment_option, PaymentOption::Deposit);
    assert_eq!(claims.phone.as_deref(), Some("4155550134"));
    assert_eq!(claims.amount, 6000);
    assert_eq!(claims.expires_at, response.expires_at);
}

#[tokio::test]
async fn unpaid_intent_gets_no_token() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments {
        retrieved: Some(paid_intent("requires_payment_method", 6000)),
        ..Default::default()
    });

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create-token",
        token_request(6000),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn amount_mismatch_gets_no_token() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments {
        retrieved: Some(paid_intent("succeeded", 6000)),
        ..Default::default()
    });

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create-token",
        token_request(12000),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn token_for_another_client_is_refused() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments {
        retrieved: Some(paid_intent("succeeded", 6000)),
        ..Default::default()
    });
    let mut body = token_request(6000);
    body["contact"] = json!({ "name": "Sam Ortiz", "email": "sam@example.com" });

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create-token",
        body,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn contact_email_matches_regardless_of_case() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments {
        retrieved: Some(paid_intent("succeeded", 6000)),
        ..Default::default()
    });
    let mut body = token_request(6000);
    body["contact"]["email"] = json!(" Dana@Example.com ");

    let (status, body) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create-token",
        body,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);
}

// --- redeem ---

fn claims() -> BookingClaims {
    BookingClaims {
        payment_intent_id: "pi_paid".into(),
        event_type_id: EVENT_TYPE_ID,
        slot_start: slot_start(),
        timezone: "America/Los_Angeles".into(),
        reservation_id: Some("res-1".into()),
        service_id: "svc_1".into(),
        service_name: "Signature Facial".into(),
        name: "Dana Reyes".into(),
        email: "dana@example.com".into(),
        phone: None,
        notes: Some("Sensitive skin".into()),
        amount: 6000,
        currency: "usd".into(),
        payment_option: PaymentOption::Deposit,
        issued_at: Utc::now(),
        expires_at: Utc::now(),
    }
}

async fn repository() -> SqlBookingRepository {
    let repo = SqlBookingRepository::new(DbClient::from_url("sqlite::memory:").await.unwrap());
    repo.init_schema().await.unwrap();
    repo
}

#[tokio::test]
async fn redeeming_twice_books_once() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());
    let repo = repository().await;
    let booking_state = state(&scheduler, &payments, Some(repo.clone()));
    let (token, _) = issue_token(&booking_config(), claims(), Utc::now()).unwrap();

    let (status, body) = post_json(
        booking_state.clone(),
        "/bookings/create",
        json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);
    let first: RedeemResponse = serde_json::from_slice(&body).unwrap();
    assert!(!first.already_booked);
    assert_eq!(first.booking_uid.as_deref(), Some("bk_1"));

    let sent = scheduler.bookings.lock().unwrap()[0].clone();
    assert_eq!(sent.reservation_id.as_deref(), Some("res-1"));
    assert_eq!(sent.attendee.notes.as_deref(), Some("Sensitive skin"));

    let stored = repo.find_by_payment_intent("pi_paid").await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::DepositPaid);
    assert_eq!(stored.amount_paid, 6000);
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.external_booking_uid.as_deref(), Some("bk_1"));

    let (status, body) =
        post_json(booking_state, "/bookings/create", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    let second: RedeemResponse = serde_json::from_slice(&body).unwrap();
    assert!(second.already_booked);
    assert_eq!(second.end_time, first.end_time);
    assert_eq!(scheduler.booking_count(), 1);
}

#[tokio::test]
async fn concurrent_redeems_book_once() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());
    let booking_state = state(&scheduler, &payments, Some(repository().await));
    let (token, _) = issue_token(&booking_config(), claims(), Utc::now()).unwrap();

    let (a, b) = tokio::join!(
        post_json(
            booking_state.clone(),
            "/bookings/create",
            json!({ "token": token })
        ),
        post_json(
            booking_state.clone(),
            "/bookings/create",
            json!({ "token": token })
        ),
    );

    assert_eq!(scheduler.booking_count(), 1);
    let fresh = [&a, &b]
        .iter()
        .filter(|(status, body)| {
            *status == StatusCode::OK
                && !serde_json::from_slice::<RedeemResponse>(body)
                    .unwrap()
                    .already_booked
        })
        .count();
    assert_eq!(fresh, 1);
    for (status, body) in [&a, &b] {
        assert!(
            *status == StatusCode::OK || *status == StatusCode::CONFLICT,
            "{} {:?}",
            status,
            body
        );
    }
}

#[tokio::test]
async fn failed_booking_releases_the_payment() {
    let scheduler = Arc::new(MockScheduler {
        slot_taken: true,
        ..Default::default()
    });
    let payments = Arc::new(MockPayments::default());
    let repo = repository().await;
    let (token, _) = issue_token(&booking_config(), claims(), Utc::now()).unwrap();

    let (status, _) = post_json(
        state(&scheduler, &payments, Some(repo.clone())),
        "/bookings/create",
        json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(repo.find_by_payment_intent("pi_paid").await.unwrap().is_none());

    let scheduler = Arc::new(MockScheduler::default());
    let (status, body) = post_json(
        state(&scheduler, &payments, Some(repo.clone())),
        "/bookings/create",
        json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);
    let response: RedeemResponse = serde_json::from_slice(&body).unwrap();
    assert!(!response.already_booked);
    assert_eq!(scheduler.booking_count(), 1);
}

#[tokio::test]
async fn redeem_without_booking_store_is_refused() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());
    let (token, _) = issue_token(&booking_config(), claims(), Utc::now()).unwrap();

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create",
        json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(scheduler.booking_count(), 0);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());
    let (token, _) = issue_token(&booking_config(), claims(), Utc::now()).unwrap();
    let tampered = format!("x{}", token);

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create",
        json!({ "token": tampered }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(scheduler.booking_count(), 0);
}

#[tokio::test]
async fn expired_token_is_gone() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());
    let (token, _) =
        issue_token(&booking_config(), claims(), Utc::now() - Duration::hours(1)).unwrap();

    let (status, _) = post_json(
        state(&scheduler, &payments, None),
        "/bookings/create",
        json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn disabled_booking_returns_503() {
    let scheduler = Arc::new(MockScheduler::default());
    let payments = Arc::new(MockPayments::default());
    let mut booking_state = state(&scheduler, &payments, None);
    booking_state.config = Arc::new(AppConfig::default());

    let (status, _) = post_json(
        booking_state,
        "/bookings/create",
        json!({ "token": "irrelevant" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
