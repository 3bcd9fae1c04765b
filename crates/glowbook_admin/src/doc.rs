// --- File: crates/glowbook_admin/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::bookings::{CancelBookingRequest, RescheduleBookingRequest};
use crate::handlers::{LoginRequest, LoginResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::login_handler,
        crate::handlers::logout_handler,
        crate::bookings::list_bookings_handler,
        crate::bookings::cancel_booking_handler,
        crate::bookings::reschedule_booking_handler,
        crate::hapio_proxy::forward_handler,
        crate::hapio_proxy::create_recurring_block_handler,
        crate::hapio_proxy::update_recurring_block_handler,
        crate::hapio_proxy::create_schedule_block_handler,
        crate::hapio_proxy::update_schedule_block_handler
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        CancelBookingRequest,
        RescheduleBookingRequest,
        glowbook_db::Booking,
        glowbook_hapio::RecurringScheduleBlock,
        glowbook_hapio::ScheduleBlock
    )),
    tags(
        (name = "Admin", description = "Session-protected studio administration")
    )
)]
pub struct AdminApiDoc;
