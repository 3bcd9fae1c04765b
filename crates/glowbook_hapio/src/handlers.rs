// --- File: crates/glowbook_hapio/src/handlers.rs ---
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use glowbook_common::HttpStatusCode;
use glowbook_config::AppConfig;
use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::{Service, ServiceCatalog};
use crate::error::HapioError;

/// Shared state for the public catalog routes.
#[derive(Clone)]
pub struct HapioState {
    pub config: Arc<AppConfig>,
    /// `None` when Hapio is not configured
    pub catalog: Option<Arc<dyn ServiceCatalog>>,
}

fn catalog_of(state: &HapioState) -> Result<&Arc<dyn ServiceCatalog>, (StatusCode, String)> {
    if !state.config.use_hapio {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Services catalog is disabled.".to_string(),
        ));
    }
    state.catalog.as_ref().ok_or_else(|| {
        error!("Hapio configuration missing in AppConfig.");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error: Hapio config missing.".to_string(),
        )
    })
}

fn to_response(err: HapioError) -> (StatusCode, String) {
    error!("[Catalog] {}", err);
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
    let message = match err {
        HapioError::NotFound(msg) => msg,
        _ => "Could not load services right now.".to_string(),
    };
    (status, message)
}

/// Lists every enabled service.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/services",
    responses(
        (status = 200, description = "Catalog services", body = [Service]),
        (status = 502, description = "Hapio unavailable"),
        (status = 503, description = "Catalog disabled")
    ),
    tag = "Services"
))]
pub async fn list_services_handler(
    State(state): State<Arc<HapioState>>,
) -> Result<Json<Vec<Service>>, (StatusCode, String)> {
    let catalog = catalog_of(&state)?;
    let services = catalog.list_services().await.map_err(to_response)?;
    info!("[Catalog] Returning {} services", services.len());
    Ok(Json(services))
}

/// Looks up one service by slug.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/services/{slug}",
    params(("slug" = String, Path, description = "Service slug", example = "signature-facial")),
    responses(
        (status = 200, description = "The service", body = Service),
        (status = 404, description = "Unknown slug")
    ),
    tag = "Services"
))]
pub async fn get_service_handler(
    State(state): State<Arc<HapioState>>,
    Path(slug): Path<String>,
) -> Result<Json<Service>, (StatusCode, String)> {
    let catalog = catalog_of(&state)?;
    catalog
        .find_service(&slug)
        .await
        .map_err(to_response)?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Service '{}' not found.", slug)))
}
