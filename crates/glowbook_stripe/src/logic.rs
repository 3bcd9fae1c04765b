// --- File: crates/glowbook_stripe/src/logic.rs ---
use glowbook_common::services::PaymentIntentResult;
use glowbook_common::HTTP_CLIENT;
use glowbook_config::StripeConfig;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};

use crate::error::StripeError;
use crate::pricing::{apply_discount, discount_amount};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Data Structures ---

/// A Stripe PaymentIntent, reduced to the fields the booking flow reads.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PaymentIntent {
    #[cfg_attr(feature = "openapi", schema(example = "pi_3PqL..."))]
    pub id: String,
    /// e.g. `requires_payment_method`, `succeeded`, `canceled`
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<StripeErrorBody>,
}

impl From<PaymentIntent> for PaymentIntentResult {
    fn from(pi: PaymentIntent) -> Self {
        PaymentIntentResult {
            id: pi.id,
            status: pi.status,
            amount: pi.amount,
            currency: pi.currency,
            client_secret: pi.client_secret,
            metadata: pi.metadata,
        }
    }
}

/// The `error` object of a failed Stripe call.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeErrorBody {
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
}

/// Fields sent when creating a payment intent.
#[derive(Debug, Clone, Default)]
pub struct CreatePaymentIntentParams {
    /// Smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub receipt_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Coupon {
    pub id: String,
    #[serde(default)]
    pub amount_off: Option<i64>,
    #[serde(default)]
    pub percent_off: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

#[derive(Deserialize, Debug)]
struct PromotionCode {
    code: String,
    active: bool,
    coupon: Coupon,
}

#[derive(Deserialize, Debug)]
struct StripeList<T> {
    data: Vec<T>,
}

/// Request body of `POST /payments/validate-discount`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ValidateDiscountRequest {
    #[cfg_attr(feature = "openapi", schema(example = "GLOW20"))]
    pub code: String,
    /// Amount the discount applies to, in cents
    #[cfg_attr(feature = "openapi", schema(example = 12000))]
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DiscountValidation {
    pub valid: bool,
    pub code: String,
    /// Cents taken off; 0 for invalid codes
    pub discount_amount: i64,
    /// Amount after the discount; unchanged for invalid codes
    pub final_amount: i64,
    /// Reason an invalid code was rejected
    pub message: Option<String>,
}

impl DiscountValidation {
    pub fn invalid(code: &str, amount: i64, message: &str) -> Self {
        Self {
            valid: false,
            code: code.to_string(),
            discount_amount: 0,
            final_amount: amount,
            message: Some(message.to_string()),
        }
    }
}

// --- Stripe API calls ---

fn api_url(config: &StripeConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn secret_key(config: &StripeConfig) -> Result<&str, StripeError> {
    if config.secret_key.is_empty() || config.secret_key == glowbook_config::SECRET_MARKER {
        return Err(StripeError::ConfigError);
    }
    Ok(&config.secret_key)
}

/// Extracts `error.message` from a Stripe error body, falling back to the raw text.
pub(crate) fn stripe_error_message(body_text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body_text) {
        Ok(json_body) => json_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(body_text)
            .to_string(),
        Err(_) => body_text.to_string(),
    }
}

async fn send_stripe<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, StripeError> {
    let response = request.send().await?;
    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        Ok(serde_json::from_str(&body_text)?)
    } else {
        let message = stripe_error_message(&body_text);
        error!(
            "[Stripe Logic] Stripe API request failed with HTTP status: {}. Message: {}",
            status, message
        );
        Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message,
        })
    }
}

/// Creates a card payment intent.
pub async fn create_payment_intent(
    config: &StripeConfig,
    params: CreatePaymentIntentParams,
) -> Result<PaymentIntent, StripeError> {
    let key = secret_key(config)?;
    info!(
        "[Stripe Logic] Creating PaymentIntent for {} {}",
        params.amount, params.currency
    );

    let mut form_body: Vec<(String, String)> = vec![
        ("amount".to_string(), params.amount.to_string()),
        ("currency".to_string(), params.currency.to_lowercase()),
        ("payment_method_types[]".to_string(), "card".to_string()),
    ];
    if let Some(description) = params.description {
        form_body.push(("description".to_string(), description));
    }
    if let Some(email) = params.receipt_email {
        form_body.push(("receipt_email".to_string(), email));
    }
    let mut metadata: Vec<_> = params.metadata.into_iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        form_body.push((format!("metadata[{}]", key), value));
    }

    let intent: PaymentIntent = send_stripe(
        HTTP_CLIENT
            .post(api_url(config, "payment_intents"))
            .basic_auth(key, None::<&str>)
            .form(&form_body),
    )
    .await?;
    info!("[Stripe Logic] PaymentIntent {} created", intent.id);
    Ok(intent)
}

pub async fn retrieve_payment_intent(
    config: &StripeConfig,
    payment_intent_id: &str,
) -> Result<PaymentIntent, StripeError> {
    let key = secret_key(config)?;
    send_stripe(
        HTTP_CLIENT
            .get(api_url(config, &format!("payment_intents/{}", payment_intent_id)))
            .basic_auth(key, None::<&str>),
    )
    .await
}

pub async fn cancel_payment_intent(
    config: &StripeConfig,
    payment_intent_id: &str,
) -> Result<PaymentIntent, StripeError> {
    let key = secret_key(config)?;
    info!("[Stripe Logic] Cancelling PaymentIntent {}", payment_intent_id);
    send_stripe(
        HTTP_CLIENT
            .post(api_url(
                config,
                &format!("payment_intents/{}/cancel", payment_intent_id),
            ))
            .basic_auth(key, None::<&str>),
    )
    .await
}

/// Looks up an active promotion code and returns its coupon.
pub async fn find_promotion_code(
    config: &StripeConfig,
    code: &str,
) -> Result<Option<Coupon>, StripeError> {
    let key = secret_key(config)?;
    let list: StripeList<PromotionCode> = send_stripe(
        HTTP_CLIENT
            .get(api_url(config, "promotion_codes"))
            .basic_auth(key, None::<&str>)
            .query(&[("code", code), ("active", "true"), ("limit", "1")]),
    )
    .await?;

    Ok(list
        .data
        .into_iter()
        .find(|p| p.active && p.code.eq_ignore_ascii_case(code))
        .map(|p| p.coupon))
}

/// Validates a discount code against `amount` (cents).
///
/// Unknown, inactive or non-applicable codes yield `valid: false` with the
/// amount unchanged; only transport and API failures are errors.
pub async fn validate_discount(
    config: &StripeConfig,
    code: &str,
    amount: i64,
    currency: &str,
) -> Result<DiscountValidation, StripeError> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(DiscountValidation::invalid(code, amount, "Enter a discount code."));
    }

    let Some(coupon) = find_promotion_code(config, code).await? else {
        info!("[Stripe Logic] Discount code '{}' not found", code);
        return Ok(DiscountValidation::invalid(
            code,
            amount,
            "This discount code is invalid or has expired.",
        ));
    };
    if !coupon.valid {
        return Ok(DiscountValidation::invalid(
            code,
            amount,
            "This discount code is invalid or has expired.",
        ));
    }

    match discount_amount(&coupon, amount, currency) {
        Some(discount) => {
            let final_amount = apply_discount(amount, discount);
            Ok(DiscountValidation {
                valid: true,
                code: code.to_string(),
                discount_amount: amount - final_amount,
                final_amount,
                message: None,
            })
        }
        None => Ok(DiscountValidation::invalid(
            code,
            amount,
            "This discount code does not apply to this purchase.",
        )),
    }
}
