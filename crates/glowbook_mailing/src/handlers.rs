// --- File: crates/glowbook_mailing/src/handlers.rs ---
use axum::{extract::State, http::StatusCode, response::Json};
use glowbook_common::services::MarketingService;
use glowbook_common::{validate_contact, ContactDetails};
use glowbook_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::MailingError;

pub type Marketing = Arc<dyn MarketingService<Error = MailingError>>;

#[derive(Clone)]
pub struct MailingState {
    pub config: Arc<AppConfig>,
    pub marketing: Option<Marketing>,
}

/// Body of every email-capture form on the site.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SubscribeRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Dana Reyes"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "dana@example.com"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Which form the contact came from, e.g. `footer` or `home-offer`
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Contact subscribed", body = SubscribeResponse),
        (status = 400, description = "Invalid contact details"),
        (status = 502, description = "Mailing platform error"),
        (status = 503, description = "Mailing disabled")
    ),
    tag = "Mailing"
))]
pub async fn subscribe_handler(
    State(state): State<Arc<MailingState>>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, (StatusCode, String)> {
    if !state.config.use_mailing {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Mailing service is disabled.".to_string(),
        ));
    }
    let marketing = state.marketing.as_ref().ok_or_else(|| {
        error!("Mailing configuration missing in AppConfig.");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error: mailing config missing.".to_string(),
        )
    })?;

    let contact = validate_contact(&ContactDetails {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        notes: None,
    })
    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let source = payload
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    marketing.subscribe(&contact, source).await.map_err(|e| {
        error!("[Mailing] Subscribe failed: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            "We couldn't sign you up right now. Please try again.".to_string(),
        )
    })?;

    info!("[Mailing] Subscribed contact from {:?}", source);
    Ok(Json(SubscribeResponse {
        success: true,
        message: "Thanks for subscribing!".to_string(),
    }))
}
