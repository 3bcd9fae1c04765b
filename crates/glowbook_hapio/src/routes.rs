// --- File: crates/glowbook_hapio/src/routes.rs ---
use axum::{routing::get, Router};
use glowbook_config::AppConfig;
use std::sync::Arc;
use tracing::warn;

use crate::catalog::{HapioCatalog, ServiceCatalog};
use crate::client::HapioClient;
use crate::handlers::{get_service_handler, list_services_handler, HapioState};

/// Public catalog routes, backed by the live Hapio API.
pub fn routes(config: Arc<AppConfig>) -> Router {
    let catalog: Option<Arc<dyn ServiceCatalog>> = match HapioClient::from_config(&config) {
        Ok(client) => Some(Arc::new(HapioCatalog::new(client))),
        Err(e) => {
            warn!("Services catalog not available: {}", e);
            None
        }
    };
    routes_with_catalog(config, catalog)
}

/// Same routes with an injected catalog.
pub fn routes_with_catalog(
    config: Arc<AppConfig>,
    catalog: Option<Arc<dyn ServiceCatalog>>,
) -> Router {
    let state = Arc::new(HapioState { config, catalog });

    Router::new()
        .route("/services", get(list_services_handler))
        .route("/services/{slug}", get(get_service_handler))
        .with_state(state)
}
