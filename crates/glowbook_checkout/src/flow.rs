// --- File: crates/glowbook_checkout/src/flow.rs ---
//! Payment submission: contact check, held slot, intent, card, token.
//!
//! Any failure stops the flow. The held reservation is left alone; it
//! expires on its own or is released by the hold.

use glowbook_booking::{CreateIntentRequest, CreateTokenRequest};
use glowbook_common::{validate_contact, ContactDetails, SlotSelection};
use glowbook_stripe::pricing::{parse_price_cents, quote};
use glowbook_stripe::{PaymentOption, PriceQuote, StripeError, ValidateDiscountRequest};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{CardConfirmer, StudioApi};
use crate::error::CheckoutError;
use crate::hold::HoldSnapshot;

/// A discount code the API accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    pub code: String,
    /// Cents taken off the base price
    pub amount: i64,
}

/// What the client filled in on the payment step.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub service_slug: String,
    /// Display price of the service, e.g. `"From $120"`
    pub display_price: String,
    pub slot: Option<SlotSelection>,
    pub contact: ContactDetails,
    pub discount: Option<AppliedDiscount>,
    pub payment_option: PaymentOption,
    pub deposit_acknowledged: bool,
    /// Card payment method id from the card element
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub payment_intent_id: String,
    pub quote: PriceQuote,
    pub token: String,
    /// Verification page the browser is sent to
    pub redirect_url: String,
}

fn pricing_error(err: StripeError) -> CheckoutError {
    match err {
        StripeError::DepositNotAcknowledged => CheckoutError::DepositNotAcknowledged,
        other => CheckoutError::InvalidPrice(other.to_string()),
    }
}

/// Drives one payment submission.
#[derive(Clone)]
pub struct Checkout {
    api: Arc<dyn StudioApi>,
    cards: Arc<dyn CardConfirmer>,
    currency: String,
}

impl Checkout {
    pub fn new(
        api: Arc<dyn StudioApi>,
        cards: Arc<dyn CardConfirmer>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            api,
            cards,
            currency: currency.into(),
        }
    }

    /// The amounts shown on the form. Fails for a deposit that was not
    /// acknowledged.
    pub fn quote(&self, form: &CheckoutForm) -> Result<PriceQuote, CheckoutError> {
        let base = parse_price_cents(&form.display_price).map_err(pricing_error)?;
        let discount = form.discount.as_ref().map_or(0, |d| d.amount);
        quote(
            base,
            discount,
            form.payment_option,
            form.deposit_acknowledged,
        )
        .map_err(pricing_error)
    }

    /// Checks `code` with the API. A valid code replaces the form's discount;
    /// an invalid one leaves the form unchanged and returns the reason.
    pub async fn apply_discount(
        &self,
        form: &mut CheckoutForm,
        code: &str,
    ) -> Result<AppliedDiscount, CheckoutError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CheckoutError::DiscountRejected(
                "Please enter a discount code.".to_string(),
            ));
        }
        let amount = parse_price_cents(&form.display_price).map_err(pricing_error)?;
        let validation = self
            .api
            .validate_discount(&ValidateDiscountRequest {
                code: code.to_string(),
                amount,
                currency: Some(self.currency.clone()),
            })
            .await?;

        if !validation.valid {
            let message = validation
                .message
                .unwrap_or_else(|| "This code is not valid.".to_string());
            info!("[Checkout] Discount code {} rejected: {}", code, message);
            return Err(CheckoutError::DiscountRejected(message));
        }

        let applied = AppliedDiscount {
            code: validation.code,
            amount: validation.discount_amount.clamp(0, amount),
        };
        info!("[Checkout] Discount {} takes {} off", applied.code, applied.amount);
        form.discount = Some(applied.clone());
        Ok(applied)
    }

    /// Runs the payment step against the current hold.
    pub async fn submit(
        &self,
        form: &CheckoutForm,
        hold: &HoldSnapshot,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let contact = validate_contact(&form.contact)?;

        let slot = form.slot.as_ref().ok_or(CheckoutError::ReservationRequired)?;
        let Some(reservation) = hold.held_reservation_for(slot) else {
            warn!("[Checkout] Submit without a verified hold on {}", slot.slot_key());
            return Err(CheckoutError::ReservationRequired);
        };

        let expected = self.quote(form)?;
        if expected.amount_due <= 0 {
            return Err(CheckoutError::InvalidPrice("nothing to charge".to_string()));
        }

        let intent = self
            .api
            .create_intent(&CreateIntentRequest {
                service_slug: form.service_slug.clone(),
                slot: slot.clone(),
                reservation_id: reservation.id.clone(),
                contact: contact.clone(),
                discount_code: form.discount.as_ref().map(|d| d.code.clone()),
                payment_option: form.payment_option,
                deposit_acknowledged: form.deposit_acknowledged,
            })
            .await?;
        if intent.quote.amount_due != expected.amount_due {
            warn!(
                payment_intent_id = %intent.payment_intent_id,
                "[Checkout] Server charges {} where the form showed {}",
                intent.quote.amount_due,
                expected.amount_due
            );
        }

        let payment = self
            .cards
            .confirm_card(
                &intent.payment_intent_id,
                &intent.client_secret,
                &form.payment_method,
            )
            .await?;
        if !payment.is_paid() {
            warn!(payment_intent_id = %payment.id, "[Checkout] Payment ended in {}", payment.status);
            return Err(CheckoutError::PaymentIncomplete(payment.status));
        }

        let token = self
            .api
            .create_token(&CreateTokenRequest {
                payment_intent_id: intent.payment_intent_id.clone(),
                slot: slot.clone(),
                reservation_id: Some(reservation.id.clone()),
                contact,
                amount: intent.quote.amount_due,
            })
            .await?;

        info!(
            payment_intent_id = %intent.payment_intent_id,
            "[Checkout] Paid {} for {}",
            intent.quote.amount_due,
            slot.slot_key()
        );
        Ok(CheckoutOutcome {
            payment_intent_id: intent.payment_intent_id,
            quote: intent.quote,
            token: token.token,
            redirect_url: token.redirect_url,
        })
    }
}
