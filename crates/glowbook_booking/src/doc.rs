// --- File: crates/glowbook_booking/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    CreateIntentRequest, CreateIntentResponse, CreateTokenRequest, CreateTokenResponse,
    RedeemRequest, RedeemResponse,
};
use crate::token::BookingClaims;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_intent_handler,
        crate::handlers::create_token_handler,
        crate::handlers::create_booking_handler
    ),
    components(schemas(
        CreateIntentRequest,
        CreateIntentResponse,
        CreateTokenRequest,
        CreateTokenResponse,
        RedeemRequest,
        RedeemResponse,
        BookingClaims
    )),
    tags(
        (name = "Booking", description = "Payment and booking orchestration")
    )
)]
pub struct BookingApiDoc;
