// --- File: crates/glowbook_admin/src/routes.rs ---
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use glowbook_cal::{CalClient, Scheduler};
use glowbook_config::AppConfig;
use glowbook_db::SqlBookingRepository;
use glowbook_hapio::HapioClient;
use std::sync::Arc;
use tracing::warn;

use crate::auth::admin_auth_middleware;
use crate::bookings::{cancel_booking_handler, list_bookings_handler, reschedule_booking_handler};
use crate::handlers::{login_handler, logout_handler, AdminState};
use crate::hapio_proxy::{
    create_recurring_block_handler, create_schedule_block_handler, forward_handler,
    update_recurring_block_handler, update_schedule_block_handler,
};

/// Creates a router containing all routes for the admin area.
pub fn routes(config: Arc<AppConfig>, bookings: Option<SqlBookingRepository>) -> Router {
    let hapio = match HapioClient::from_config(&config) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Admin scheduling editors running without Hapio: {}", e);
            None
        }
    };
    let scheduler: Option<Scheduler> = match CalClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Admin booking management running without Cal.com: {}", e);
            None
        }
    };

    routes_with(AdminState {
        config,
        hapio,
        scheduler,
        bookings,
    })
}

fn hapio_routes() -> Router<Arc<AdminState>> {
    let entity = || -> MethodRouter<Arc<AdminState>> {
        get(forward_handler)
            .patch(forward_handler)
            .delete(forward_handler)
    };
    let collection = || -> MethodRouter<Arc<AdminState>> {
        get(forward_handler).post(forward_handler)
    };

    Router::new()
        .route("/locations", collection())
        .route("/locations/{id}", entity())
        .route("/services", collection())
        .route("/services/{id}", entity())
        .route("/resources", collection())
        .route("/resources/{resource_id}", entity())
        .route(
            "/resources/{resource_id}/recurring-schedules",
            collection(),
        )
        .route(
            "/resources/{resource_id}/recurring-schedules/{schedule_id}",
            entity(),
        )
        .route(
            "/resources/{resource_id}/recurring-schedules/{schedule_id}/schedule-blocks",
            get(forward_handler).post(create_recurring_block_handler),
        )
        .route(
            "/resources/{resource_id}/recurring-schedules/{schedule_id}/schedule-blocks/{block_id}",
            get(forward_handler)
                .patch(update_recurring_block_handler)
                .delete(forward_handler),
        )
        .route(
            "/resources/{resource_id}/schedule-blocks",
            get(forward_handler).post(create_schedule_block_handler),
        )
        .route(
            "/resources/{resource_id}/schedule-blocks/{block_id}",
            get(forward_handler)
                .patch(update_schedule_block_handler)
                .delete(forward_handler),
        )
}

/// Same routes over an injected state. Everything except login sits behind
/// the session middleware.
pub fn routes_with(state: AdminState) -> Router {
    let state = Arc::new(state);

    let guarded = Router::new()
        .route("/admin/logout", post(logout_handler))
        .route("/admin/bookings", get(list_bookings_handler))
        .route("/admin/bookings/{id}/cancel", post(cancel_booking_handler))
        .route(
            "/admin/bookings/{id}/reschedule",
            post(reschedule_booking_handler),
        )
        .nest("/admin/hapio", hapio_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/admin/login", post(login_handler))
        .merge(guarded)
        .with_state(state)
}
