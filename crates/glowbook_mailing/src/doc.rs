// --- File: crates/glowbook_mailing/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{SubscribeRequest, SubscribeResponse};

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::subscribe_handler),
    components(schemas(SubscribeRequest, SubscribeResponse)),
    tags(
        (name = "Mailing", description = "Email capture")
    )
)]
pub struct MailingApiDoc;
