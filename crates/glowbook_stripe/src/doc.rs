// --- File: crates/glowbook_stripe/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{DiscountValidation, PaymentIntent, StripeErrorBody, ValidateDiscountRequest};
use crate::pricing::{PaymentOption, PriceQuote};
use crate::webhook::{StripeEvent, StripeEventData};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::validate_discount_handler,
        crate::handlers::stripe_webhook_handler
    ),
    components(schemas(
        ValidateDiscountRequest,
        DiscountValidation,
        PaymentIntent,
        StripeErrorBody,
        PaymentOption,
        PriceQuote,
        StripeEvent,
        StripeEventData
    )),
    tags(
        (name = "Payments", description = "Stripe discounts and webhooks")
    )
)]
pub struct StripeApiDoc;
