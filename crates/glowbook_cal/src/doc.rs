// --- File: crates/glowbook_cal/src/doc.rs ---
#![cfg(feature = "openapi")]
use glowbook_common::{Reservation, SlotSelection};
use utoipa::OpenApi;

use crate::availability::{AvailabilityQuery, AvailabilityResponse, DaySlots, SlotOption};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::create_reservation_handler,
        crate::handlers::release_reservation_handler,
        crate::handlers::verify_reservation_handler
    ),
    components(schemas(
        AvailabilityQuery,
        AvailabilityResponse,
        DaySlots,
        SlotOption,
        SlotSelection,
        Reservation
    )),
    tags(
        (name = "Cal", description = "Cal.com availability and slot reservations")
    )
)]
pub struct CalApiDoc;
