// --- File: crates/glowbook_checkout/src/api.rs ---
//! Calls the checkout makes against the studio's public API and Stripe.
//!
//! Both seams are traits so the hold and the payment flow can be driven
//! against in-memory fakes.

use glowbook_booking::{
    CreateIntentRequest, CreateIntentResponse, CreateTokenRequest, CreateTokenResponse,
};
use glowbook_cal::AvailabilityResponse;
use glowbook_common::services::BoxFuture;
use glowbook_common::{Reservation, SlotSelection, HTTP_CLIENT};
use glowbook_stripe::{DiscountValidation, ValidateDiscountRequest};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CheckoutError;

/// Window of the availability panel.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub slug: String,
    /// YYYY-MM-DD
    pub start: String,
    pub days: u32,
}

/// The studio endpoints used during checkout.
pub trait StudioApi: Send + Sync {
    fn availability(
        &self,
        request: &AvailabilityRequest,
    ) -> BoxFuture<'_, AvailabilityResponse, CheckoutError>;

    fn reserve(&self, slot: &SlotSelection) -> BoxFuture<'_, Reservation, CheckoutError>;

    /// Fails when the hold is gone or expired.
    fn verify_reservation(&self, reservation_id: &str)
        -> BoxFuture<'_, Reservation, CheckoutError>;

    fn release_reservation(&self, reservation_id: &str) -> BoxFuture<'_, (), CheckoutError>;

    fn validate_discount(
        &self,
        request: &ValidateDiscountRequest,
    ) -> BoxFuture<'_, DiscountValidation, CheckoutError>;

    fn create_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> BoxFuture<'_, CreateIntentResponse, CheckoutError>;

    fn create_token(
        &self,
        request: &CreateTokenRequest,
    ) -> BoxFuture<'_, CreateTokenResponse, CheckoutError>;
}

/// Outcome of a card confirmation.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConfirmedPayment {
    pub id: String,
    pub status: String,
    pub amount: i64,
}

impl ConfirmedPayment {
    pub fn is_paid(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "requires_capture")
    }
}

/// Confirms a payment intent with the card the client entered.
pub trait CardConfirmer: Send + Sync {
    fn confirm_card(
        &self,
        payment_intent_id: &str,
        client_secret: &str,
        payment_method: &str,
    ) -> BoxFuture<'_, ConfirmedPayment, CheckoutError>;
}

/// [`StudioApi`] over HTTP. `base_url` is the backend's `/api` root.
#[derive(Clone, Debug)]
pub struct HttpStudioApi {
    http: Client,
    base_url: String,
}

impl HttpStudioApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("[Checkout] {} {}", method, url);
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, CheckoutError> {
        let body_text = Self::send_raw(builder).await?;
        Ok(serde_json::from_str(&body_text)?)
    }

    async fn send_raw(builder: RequestBuilder) -> Result<String, CheckoutError> {
        let response = builder.send().await?;
        let status = response.status();
        let body_text = response.text().await?;
        if !status.is_success() {
            warn!("[Checkout] Studio API answered {}: {}", status, body_text);
            return Err(CheckoutError::ApiError {
                status_code: status.as_u16(),
                message: body_text,
            });
        }
        Ok(body_text)
    }
}

impl StudioApi for HttpStudioApi {
    fn availability(
        &self,
        request: &AvailabilityRequest,
    ) -> BoxFuture<'_, AvailabilityResponse, CheckoutError> {
        let builder = self.request(Method::GET, "cal/availability").query(request);
        Box::pin(async move { Self::send(builder).await })
    }

    fn reserve(&self, slot: &SlotSelection) -> BoxFuture<'_, Reservation, CheckoutError> {
        let builder = self.request(Method::POST, "cal/reservations").json(slot);
        Box::pin(async move { Self::send(builder).await })
    }

    fn verify_reservation(
        &self,
        reservation_id: &str,
    ) -> BoxFuture<'_, Reservation, CheckoutError> {
        let builder = self.request(
            Method::GET,
            &format!("cal/reservations/{}/verify", reservation_id),
        );
        Box::pin(async move { Self::send(builder).await })
    }

    fn release_reservation(&self, reservation_id: &str) -> BoxFuture<'_, (), CheckoutError> {
        let builder = self.request(
            Method::DELETE,
            &format!("cal/reservations/{}", reservation_id),
        );
        Box::pin(async move { Self::send_raw(builder).await.map(|_| ()) })
    }

    fn validate_discount(
        &self,
        request: &ValidateDiscountRequest,
    ) -> BoxFuture<'_, DiscountValidation, CheckoutError> {
        let builder = self
            .request(Method::POST, "payments/validate-discount")
            .json(request);
        Box::pin(async move { Self::send(builder).await })
    }

    fn create_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> BoxFuture<'_, CreateIntentResponse, CheckoutError> {
        let builder = self
            .request(Method::POST, "payments/create-intent")
            .json(request);
        Box::pin(async move { Self::send(builder).await })
    }

    fn create_token(
        &self,
        request: &CreateTokenRequest,
    ) -> BoxFuture<'_, CreateTokenResponse, CheckoutError> {
        let builder = self
            .request(Method::POST, "bookings/create-token")
            .json(request);
        Box::pin(async move { Self::send(builder).await })
    }
}

/// Confirms intents with the publishable key, the way Stripe.js does from a
/// browser: the client secret proves the caller owns the intent.
#[derive(Clone, Debug)]
pub struct StripeCardConfirmer {
    http: Client,
    api_base: String,
    publishable_key: String,
}

impl StripeCardConfirmer {
    pub fn new(api_base: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            publishable_key: publishable_key.into(),
        }
    }

    /// Builds a confirmer from the `stripe` section; needs the publishable key.
    pub fn from_config(config: &glowbook_config::AppConfig) -> Result<Self, CheckoutError> {
        let stripe = config
            .stripe
            .as_ref()
            .ok_or_else(|| CheckoutError::ConfigError("stripe section missing".to_string()))?;
        let key = stripe
            .publishable_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                CheckoutError::ConfigError("stripe.publishable_key missing".to_string())
            })?;
        Ok(Self::new(&stripe.api_base, key))
    }
}

/// Stripe's `error.message`, falling back to the raw body.
fn stripe_error_message(body_text: &str) -> String {
    serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body_text.to_string())
}

impl CardConfirmer for StripeCardConfirmer {
    fn confirm_card(
        &self,
        payment_intent_id: &str,
        client_secret: &str,
        payment_method: &str,
    ) -> BoxFuture<'_, ConfirmedPayment, CheckoutError> {
        let url = format!(
            "{}/payment_intents/{}/confirm",
            self.api_base, payment_intent_id
        );
        let form = [
            ("client_secret", client_secret.to_string()),
            ("payment_method", payment_method.to_string()),
        ];
        let builder = self
            .http
            .post(url)
            .bearer_auth(&self.publishable_key)
            .form(&form);

        Box::pin(async move {
            let response = builder.send().await?;
            let status = response.status();
            let body_text = response.text().await?;

            if status == StatusCode::PAYMENT_REQUIRED {
                let message = stripe_error_message(&body_text);
                warn!("[Checkout] Card declined: {}", message);
                return Err(CheckoutError::CardDeclined(message));
            }
            if !status.is_success() {
                return Err(CheckoutError::ApiError {
                    status_code: status.as_u16(),
                    message: stripe_error_message(&body_text),
                });
            }
            Ok(serde_json::from_str(&body_text)?)
        })
    }
}
