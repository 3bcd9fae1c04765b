// --- File: crates/glowbook_booking/src/routes.rs ---
use axum::{routing::post, Router};
use glowbook_cal::{CalClient, Scheduler};
use glowbook_config::AppConfig;
use glowbook_db::SqlBookingRepository;
use glowbook_hapio::{HapioCatalog, HapioClient, ServiceCatalog};
use glowbook_stripe::StripePaymentService;
use std::sync::Arc;
use tracing::{info, warn};

use crate::handlers::{
    create_booking_handler, create_intent_handler, create_token_handler, BookingState, Discounts,
    Payments,
};

/// Creates the booking routes with the live Cal.com, Stripe and Hapio clients.
pub fn routes(config: Arc<AppConfig>, bookings: Option<SqlBookingRepository>) -> Router {
    let scheduler: Option<Scheduler> = match CalClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Booking: Cal.com client not available: {}", e);
            None
        }
    };
    let (payments, discounts): (Option<Payments>, Option<Discounts>) =
        match StripePaymentService::from_config(&config) {
            Ok(service) => {
                let service = Arc::new(service);
                let payments: Payments = service.clone();
                let discounts: Discounts = service;
                (Some(payments), Some(discounts))
            }
            Err(e) => {
                warn!("Booking: Stripe client not available: {}", e);
                (None, None)
            }
        };
    let catalog: Option<Arc<dyn ServiceCatalog>> = match HapioClient::from_config(&config) {
        Ok(client) => Some(Arc::new(HapioCatalog::new(client))),
        Err(e) => {
            warn!("Booking: services catalog not available: {}", e);
            None
        }
    };
    if bookings.is_none() {
        info!("Booking: no database configured, bookings are not recorded locally");
    }

    routes_with(BookingState {
        config,
        scheduler,
        payments,
        discounts,
        catalog,
        bookings,
    })
}

/// Same routes over an explicit state.
pub fn routes_with(state: BookingState) -> Router {
    Router::new()
        .route("/payments/create-intent", post(create_intent_handler))
        .route("/bookings/create-token", post(create_token_handler))
        .route("/bookings/create", post(create_booking_handler))
        .with_state(Arc::new(state))
}
