// --- File: crates/glowbook_stripe/src/routes.rs ---
use axum::{routing::post, Router};
use glowbook_config::AppConfig;
use glowbook_db::SqlBookingRepository;
use std::sync::Arc;

use crate::handlers::{stripe_webhook_handler, validate_discount_handler, StripeState};

/// Creates a router containing all routes for the Stripe feature.
pub fn routes(config: Arc<AppConfig>, bookings: Option<SqlBookingRepository>) -> Router {
    let stripe_state = Arc::new(StripeState { config, bookings });

    Router::new()
        .route(
            "/payments/validate-discount",
            post(validate_discount_handler),
        )
        .route("/payments/webhook", post(stripe_webhook_handler))
        .with_state(stripe_state)
}
