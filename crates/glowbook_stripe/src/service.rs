// --- File: crates/glowbook_stripe/src/service.rs ---
use glowbook_common::services::{BoxFuture, PaymentIntentResult, PaymentService};
use glowbook_config::{AppConfig, StripeConfig};
use std::collections::HashMap;

use crate::error::StripeError;
use crate::logic::{
    cancel_payment_intent, create_payment_intent, retrieve_payment_intent, validate_discount,
    CreatePaymentIntentParams, DiscountValidation,
};

/// Stripe payment service implementation
#[derive(Clone, Debug)]
pub struct StripePaymentService {
    config: StripeConfig,
}

impl StripePaymentService {
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, StripeError> {
        config
            .stripe
            .clone()
            .map(Self::new)
            .ok_or(StripeError::ConfigError)
    }

    pub fn stripe_config(&self) -> &StripeConfig {
        &self.config
    }

    /// Validates a promotion code against `amount` (cents).
    pub async fn validate_discount(
        &self,
        code: &str,
        amount: i64,
        currency: &str,
    ) -> Result<DiscountValidation, StripeError> {
        validate_discount(&self.config, code, amount, currency).await
    }
}

impl PaymentService for StripePaymentService {
    type Error = StripeError;

    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        description: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error> {
        let params = CreatePaymentIntentParams {
            amount,
            currency: currency.to_string(),
            description: description.map(str::to_string),
            receipt_email: metadata.get("email").cloned(),
            metadata,
        };
        Box::pin(async move {
            let intent = create_payment_intent(&self.config, params).await?;
            Ok(intent.into())
        })
    }

    fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error> {
        let payment_intent_id = payment_intent_id.to_string();
        Box::pin(async move {
            let intent = retrieve_payment_intent(&self.config, &payment_intent_id).await?;
            Ok(intent.into())
        })
    }

    fn cancel_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> BoxFuture<'_, PaymentIntentResult, Self::Error> {
        let payment_intent_id = payment_intent_id.to_string();
        Box::pin(async move {
            let intent = cancel_payment_intent(&self.config, &payment_intent_id).await?;
            Ok(intent.into())
        })
    }
}
