// --- File: crates/glowbook_stripe/src/webhook.rs ---
//! Stripe webhook verification and event processing.

use constant_time_eq::constant_time_eq;
use glowbook_db::{BookingRepository, PaymentStatus, SqlBookingRepository};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::StripeError;

/// Maximum age of a signed webhook, in seconds.
pub const TOLERANCE_SECONDS: i64 = 300;

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEventData {
    /// The object the event is about; its shape depends on the event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String, // e.g., "payment_intent.succeeded"
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: StripeEventData,
}

/// What a processed event did to the booking store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Updated {
        payment_intent_id: String,
        status: PaymentStatus,
    },
    /// The payment has no booking yet; the status is set when the token is redeemed
    NoBooking { payment_intent_id: String },
    Ignored(String),
}

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, as Stripe signs it.
pub fn compute_signature(
    secret: &str,
    timestamp: &str,
    payload_bytes: &[u8],
) -> Result<String, StripeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload_bytes);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies the signature of an incoming Stripe webhook request.
///
/// # Arguments
/// * `payload_bytes` - The raw request body bytes.
/// * `sig_header` - The value of the 'Stripe-Signature' header.
/// * `secret` - The webhook signing secret (whsec_...).
/// * `now` - Current unix time, for the replay window.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    now: i64,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();
    for item in sig_header_value.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => timestamp_str = Some(value),
            Some(("v1", value)) => v1_signatures_hex.push(value),
            _ => {} // Ignore other schemes like v0
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError(
            "Invalid timestamp format in Stripe-Signature".to_string(),
        )
    })?;
    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    if (now - parsed_timestamp).abs() > TOLERANCE_SECONDS {
        warn!(
            "[Stripe Webhook] Timestamp outside tolerance. Current: {}, Event: {}",
            now, parsed_timestamp
        );
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected = compute_signature(secret, timestamp_str, payload_bytes)?;
    debug!("[Stripe Webhook] Checking {} v1 signature(s)", v1_signatures_hex.len());

    if v1_signatures_hex
        .iter()
        .any(|provided| constant_time_eq(expected.as_bytes(), provided.as_bytes()))
    {
        return Ok(());
    }
    Err(StripeError::WebhookSignatureError(
        "Signature mismatch".to_string(),
    ))
}

fn payment_intent_id_of(event: &StripeEvent) -> Option<String> {
    let object = &event.data.object;
    let id = match event.event_type.as_str() {
        // Charges point at their payment intent
        "charge.refunded" => object.get("payment_intent"),
        _ => object.get("id"),
    };
    id.and_then(|v| v.as_str()).map(str::to_string)
}

/// Processes a verified Stripe webhook event, updating the payment status of
/// the booking tied to the payment intent.
pub async fn process_stripe_webhook(
    event: StripeEvent,
    bookings: Option<&SqlBookingRepository>,
) -> Result<WebhookOutcome, StripeError> {
    info!(
        "[Stripe Webhook] Processing event {} ({})",
        event.id, event.event_type
    );

    let status = match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let is_deposit = event
                .data
                .object
                .get("metadata")
                .and_then(|m| m.get("payment_option"))
                .and_then(|v| v.as_str())
                == Some("deposit");
            if is_deposit {
                PaymentStatus::DepositPaid
            } else {
                PaymentStatus::Paid
            }
        }
        "payment_intent.payment_failed" => PaymentStatus::Failed,
        "charge.refunded" => {
            let fully_refunded = event
                .data
                .object
                .get("refunded")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if !fully_refunded {
                info!("[Stripe Webhook] Partial refund on event {}; no status change", event.id);
                return Ok(WebhookOutcome::Ignored(event.event_type));
            }
            PaymentStatus::Refunded
        }
        _ => {
            info!("Received unhandled Stripe event type: {}", event.event_type);
            return Ok(WebhookOutcome::Ignored(event.event_type));
        }
    };

    let payment_intent_id = payment_intent_id_of(&event).ok_or_else(|| {
        StripeError::WebhookProcessingError(format!(
            "event {} has no payment intent id",
            event.id
        ))
    })?;

    let Some(repository) = bookings else {
        warn!(
            "[Stripe Webhook] No booking store configured; {} stays unrecorded",
            payment_intent_id
        );
        return Ok(WebhookOutcome::NoBooking { payment_intent_id });
    };

    if repository
        .update_payment_status(&payment_intent_id, status)
        .await?
    {
        info!(
            "[Stripe Webhook] Booking for {} marked {}",
            payment_intent_id, status
        );
        Ok(WebhookOutcome::Updated {
            payment_intent_id,
            status,
        })
    } else {
        info!(
            "[Stripe Webhook] No booking yet for {}; status {} not stored",
            payment_intent_id, status
        );
        Ok(WebhookOutcome::NoBooking { payment_intent_id })
    }
}
