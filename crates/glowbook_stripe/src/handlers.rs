// --- File: crates/glowbook_stripe/src/handlers.rs ---
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use glowbook_config::AppConfig;
use glowbook_db::SqlBookingRepository;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::StripeError;
use crate::logic::{validate_discount, DiscountValidation, ValidateDiscountRequest};
use crate::webhook::{process_stripe_webhook, verify_stripe_signature, StripeEvent};

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<AppConfig>,
    /// Booking store updated by webhooks; `None` when the database is off
    pub bookings: Option<SqlBookingRepository>,
}

/// Checks a discount code against an amount.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payments/validate-discount", // Path relative to /api
    request_body = ValidateDiscountRequest,
    responses(
        (status = 200, description = "Validation result; invalid codes have valid=false", body = DiscountValidation),
        (status = 400, description = "Bad Request"),
        (status = 502, description = "Stripe API error")
    ),
    tag = "Payments"
))]
pub async fn validate_discount_handler(
    State(state): State<Arc<StripeState>>,
    Json(payload): Json<ValidateDiscountRequest>,
) -> Result<Json<DiscountValidation>, (StatusCode, String)> {
    if !state.config.use_stripe {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Payment service is disabled.".to_string(),
        ));
    }
    let stripe_config = state.config.stripe.as_ref().ok_or_else(|| {
        error!("Stripe configuration missing in AppConfig.");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Stripe configuration not loaded.".to_string(),
        )
    })?;
    if payload.amount < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "amount must not be negative".to_string(),
        ));
    }

    let currency = payload
        .currency
        .clone()
        .unwrap_or_else(|| state.config.studio.currency.clone());
    match validate_discount(stripe_config, &payload.code, payload.amount, &currency).await {
        Ok(result) => {
            info!(
                "[Stripe] Discount '{}' valid={} discount={}",
                result.code, result.valid, result.discount_amount
            );
            Ok(Json(result))
        }
        Err(StripeError::ConfigError) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Stripe configuration error on server.".to_string(),
        )),
        Err(e) => {
            error!("[Stripe] Discount validation failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                "Could not validate the discount code right now.".to_string(),
            ))
        }
    }
}

/// Receives Stripe events. The raw body is needed for signature verification.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payments/webhook", // Path relative to /api
    responses(
        (status = 200, description = "Webhook received and acknowledged"),
        (status = 400, description = "Bad Request (e.g., invalid signature, bad payload)"),
        (status = 500, description = "Internal Server Error processing webhook")
    ),
    tag = "Payments"
))]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !state.config.use_stripe {
        return (StatusCode::SERVICE_UNAVAILABLE, "Stripe service disabled.").into_response();
    }

    let Some(webhook_secret) = state
        .config
        .stripe
        .as_ref()
        .and_then(|s| s.webhook_secret.as_deref())
        .filter(|s| !s.is_empty())
    else {
        error!("Stripe webhook secret is not configured");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    // Get the 'Stripe-Signature' header from the request
    let sig_header = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok());

    if let Err(e) = verify_stripe_signature(
        body.as_bytes(),
        sig_header,
        webhook_secret,
        Utc::now().timestamp(),
    ) {
        warn!("Stripe webhook signature verification failed: {}", e);
        return (StatusCode::BAD_REQUEST, format!("Invalid signature: {}", e)).into_response();
    }

    // Deserialize only after the signature checked out
    let event: StripeEvent = match serde_json::from_str(&body) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("Failed to deserialize Stripe webhook event: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload format".to_string()).into_response();
        }
    };

    match process_stripe_webhook(event, state.bookings.as_ref()).await {
        Ok(outcome) => {
            info!("Stripe webhook processed: {:?}", outcome);
            StatusCode::OK.into_response()
        }
        Err(e) => {
            error!("Error processing Stripe webhook: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Webhook processing error: {}", e),
            )
                .into_response()
        }
    }
}
