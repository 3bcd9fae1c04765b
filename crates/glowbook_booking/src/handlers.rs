// --- File: crates/glowbook_booking/src/handlers.rs ---
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use glowbook_cal::Scheduler;
use glowbook_common::services::PaymentService;
use glowbook_common::HttpStatusCode;
use glowbook_config::{AppConfig, BookingConfig};
use glowbook_db::SqlBookingRepository;
use glowbook_hapio::ServiceCatalog;
use glowbook_stripe::StripeError;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::BookingError;
use crate::logic::{
    create_intent, create_token, redeem_booking, CreateIntentRequest, CreateIntentResponse,
    CreateTokenRequest, CreateTokenResponse, DiscountCodes, RedeemRequest, RedeemResponse,
};

pub type Payments = Arc<dyn PaymentService<Error = StripeError>>;
pub type Discounts = Arc<dyn DiscountCodes>;

// --- State for Booking Handlers ---
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub scheduler: Option<Scheduler>,
    pub payments: Option<Payments>,
    pub discounts: Option<Discounts>,
    pub catalog: Option<Arc<dyn ServiceCatalog>>,
    /// `None` when the database is disabled; redeeming tokens then is refused
    pub bookings: Option<SqlBookingRepository>,
}

impl BookingState {
    pub(crate) fn scheduler(&self) -> Result<&Scheduler, BookingError> {
        self.scheduler
            .as_ref()
            .ok_or_else(|| BookingError::ConfigError("Cal.com client not configured".into()))
    }

    pub(crate) fn payments(&self) -> Result<&Payments, BookingError> {
        self.payments
            .as_ref()
            .ok_or_else(|| BookingError::ConfigError("Stripe client not configured".into()))
    }

    pub(crate) fn discounts(&self) -> Result<&Discounts, BookingError> {
        self.discounts
            .as_ref()
            .ok_or_else(|| BookingError::ConfigError("Stripe client not configured".into()))
    }

    pub(crate) fn catalog(&self) -> Result<&Arc<dyn ServiceCatalog>, BookingError> {
        self.catalog
            .as_ref()
            .ok_or_else(|| BookingError::ConfigError("Services catalog not configured".into()))
    }

    pub(crate) fn bookings(&self) -> Result<&SqlBookingRepository, BookingError> {
        self.bookings
            .as_ref()
            .ok_or_else(|| BookingError::ConfigError("booking store not configured".into()))
    }

    pub(crate) fn booking_config(&self) -> Result<&BookingConfig, BookingError> {
        self.config
            .booking
            .as_ref()
            .ok_or_else(|| BookingError::ConfigError("booking section missing".into()))
    }
}

fn ensure_enabled(state: &BookingState) -> Result<(), (StatusCode, String)> {
    if state.config.use_booking {
        Ok(())
    } else {
        Err(to_response(BookingError::Disabled("Online booking".into())))
    }
}

fn to_response(err: BookingError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("[Booking] {}", err);
    } else {
        warn!("[Booking] {}", err);
    }
    (status, err.user_message())
}

/// Creates the payment intent for a held slot.
///
/// The amount is recomputed from the catalog price and the discount code is
/// re-validated; the reservation must still be held and match the slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payments/create-intent", // Path relative to /api
    request_body = CreateIntentRequest,
    responses(
        (status = 200, description = "Payment intent created", body = CreateIntentResponse),
        (status = 400, description = "Invalid contact, discount or deposit acknowledgment"),
        (status = 402, description = "Declined by the payment processor"),
        (status = 404, description = "Unknown service"),
        (status = 409, description = "Reservation does not match the slot"),
        (status = 410, description = "Reservation expired"),
        (status = 503, description = "Booking disabled")
    ),
    tag = "Booking"
))]
pub async fn create_intent_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    let response = create_intent(&state, payload, Utc::now())
        .await
        .map_err(to_response)?;
    info!(
        payment_intent_id = %response.payment_intent_id,
        "[Booking] Intent created for {} {}",
        response.quote.amount_due,
        response.currency
    );
    Ok(Json(response))
}

/// Exchanges a succeeded payment for a signed booking token.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings/create-token", // Path relative to /api
    request_body = CreateTokenRequest,
    responses(
        (status = 200, description = "Signed booking token and redirect URL", body = CreateTokenResponse),
        (status = 402, description = "Payment not completed"),
        (status = 409, description = "Payment does not match the booking"),
        (status = 503, description = "Booking disabled")
    ),
    tag = "Booking"
))]
pub async fn create_token_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<CreateTokenRequest>,
) -> Result<Json<CreateTokenResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    let response = create_token(&state, payload, Utc::now())
        .await
        .map_err(to_response)?;
    Ok(Json(response))
}

/// Redeems a booking token: creates the booking at the scheduler and records it.
///
/// Redeeming the same payment twice returns the existing booking.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings/create", // Path relative to /api
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Booking created or already existing", body = RedeemResponse),
        (status = 401, description = "Invalid booking token"),
        (status = 409, description = "Slot no longer available or booking in progress"),
        (status = 410, description = "Booking token expired"),
        (status = 503, description = "Booking disabled")
    ),
    tag = "Booking"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    let response = redeem_booking(&state, payload)
        .await
        .map_err(to_response)?;
    Ok(Json(response))
}
