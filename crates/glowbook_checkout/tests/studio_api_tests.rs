use chrono::{TimeZone, Utc};
use glowbook_checkout::{
    AvailabilityRequest, CardConfirmer, CheckoutError, HttpStudioApi, StripeCardConfirmer,
    StudioApi,
};
use glowbook_common::SlotSelection;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn slot() -> SlotSelection {
    SlotSelection {
        start_time: Utc.with_ymd_and_hms(2030, 7, 16, 17, 0, 0).unwrap(),
        event_type_id: 1203456,
        timezone: "America/Los_Angeles".into(),
        duration: 60,
        label: "Tue, Jul 16 · 10:00 AM".into(),
    }
}

fn reservation_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "expires_at": "2030-07-16T16:05:00Z",
        "start_time": "2030-07-16T17:00:00Z",
        "end_time": "2030-07-16T18:00:00Z",
        "timezone": "America/Los_Angeles",
        "event_type_id": 1203456
    })
}

#[tokio::test]
async fn reserve_verify_and_release_hit_the_cal_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cal/reservations"))
        .and(body_partial_json(json!({ "event_type_id": 1203456, "duration": 60 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation_json("res-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cal/reservations/res-1/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation_json("res-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cal/reservations/res-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpStudioApi::new(format!("{}/api/", server.uri()));
    let reservation = api.reserve(&slot()).await.unwrap();
    assert!(reservation.matches(&slot()));

    let verified = api.verify_reservation("res-1").await.unwrap();
    assert_eq!(verified.id, "res-1");

    api.release_reservation("res-1").await.unwrap();
}

#[tokio::test]
async fn api_errors_carry_the_handler_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cal/reservations/res-9/verify"))
        .respond_with(
            ResponseTemplate::new(410)
                .set_body_string("Your hold on this time has expired. Please pick a time again."),
        )
        .mount(&server)
        .await;

    let api = HttpStudioApi::new(format!("{}/api", server.uri()));
    let err = api.verify_reservation("res-9").await.unwrap_err();

    assert!(matches!(err, CheckoutError::ApiError { status_code: 410, .. }));
    assert_eq!(
        err.user_message(),
        "Your hold on this time has expired. Please pick a time again."
    );
}

#[tokio::test]
async fn availability_sends_the_window_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cal/availability"))
        .and(query_param("slug", "signature-facial"))
        .and(query_param("start", "2030-07-16"))
        .and(query_param("days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event_type_id": 1203456,
            "timezone": "America/Los_Angeles",
            "start_date": "2030-07-16",
            "days": 3,
            "duration_minutes": 60,
            "slots_by_day": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpStudioApi::new(format!("{}/api", server.uri()));
    let page = api
        .availability(&AvailabilityRequest {
            slug: "signature-facial".into(),
            start: "2030-07-16".into(),
            days: 3,
        })
        .await
        .unwrap();
    assert_eq!(page.days, 3);
}

#[tokio::test]
async fn card_confirmation_uses_the_client_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents/pi_123/confirm"))
        .and(header("authorization", "Bearer pk_test_123"))
        .and(body_string_contains("client_secret=pi_123_secret_abc"))
        .and(body_string_contains("payment_method=pm_card_visa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pi_123",
            "object": "payment_intent",
            "status": "succeeded",
            "amount": 12000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let confirmer = StripeCardConfirmer::new(format!("{}/v1", server.uri()), "pk_test_123");
    let payment = confirmer
        .confirm_card("pi_123", "pi_123_secret_abc", "pm_card_visa")
        .await
        .unwrap();

    assert!(payment.is_paid());
    assert_eq!(payment.amount, 12000);
}

#[tokio::test]
async fn card_decline_message_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents/pi_123/confirm"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {
                "type": "card_error",
                "code": "card_declined",
                "decline_code": "insufficient_funds",
                "message": "Your card has insufficient funds."
            }
        })))
        .mount(&server)
        .await;

    let confirmer = StripeCardConfirmer::new(format!("{}/v1", server.uri()), "pk_test_123");
    let err = confirmer
        .confirm_card("pi_123", "pi_123_secret_abc", "pm_card_chargeDeclined")
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::CardDeclined(_)));
    assert_eq!(err.user_message(), "Your card has insufficient funds.");
}
