// --- File: crates/glowbook_cal/src/routes.rs ---
use axum::{
    routing::{delete, get, post},
    Router,
};
use glowbook_config::AppConfig;
use glowbook_hapio::{HapioCatalog, HapioClient, ServiceCatalog};
use std::sync::Arc;
use tracing::warn;

use crate::client::CalClient;
use crate::handlers::{
    create_reservation_handler, get_availability_handler, release_reservation_handler,
    verify_reservation_handler, CalState, Scheduler,
};

/// Creates a router containing all routes for the Cal.com feature.
pub fn routes(config: Arc<AppConfig>) -> Router {
    let scheduler: Option<Scheduler> = match CalClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Cal.com routes running without a scheduler: {}", e);
            None
        }
    };
    let catalog: Option<Arc<dyn ServiceCatalog>> = HapioClient::from_config(&config)
        .ok()
        .map(|client| Arc::new(HapioCatalog::new(client)) as Arc<dyn ServiceCatalog>);

    routes_with(config, scheduler, catalog)
}

/// Same routes over injected providers.
pub fn routes_with(
    config: Arc<AppConfig>,
    scheduler: Option<Scheduler>,
    catalog: Option<Arc<dyn ServiceCatalog>>,
) -> Router {
    let state = Arc::new(CalState {
        config,
        scheduler,
        catalog,
    });

    Router::new()
        .route("/cal/availability", get(get_availability_handler))
        .route("/cal/reservations", post(create_reservation_handler))
        .route("/cal/reservations/{id}", delete(release_reservation_handler))
        .route(
            "/cal/reservations/{id}/verify",
            get(verify_reservation_handler),
        )
        .with_state(state)
}
