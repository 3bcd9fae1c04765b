// --- File: crates/glowbook_hapio/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::catalog::Service;
use crate::models::{HapioService, RecurringScheduleBlock, ScheduleBlock};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_services_handler,
        crate::handlers::get_service_handler
    ),
    components(schemas(Service, HapioService, RecurringScheduleBlock, ScheduleBlock)),
    tags(
        (name = "Services", description = "Public services catalog")
    )
)]
pub struct HapioApiDoc;
