// --- File: crates/glowbook_mailing/src/routes.rs ---
use axum::{routing::post, Router};
use glowbook_config::AppConfig;
use std::sync::Arc;
use tracing::warn;

use crate::client::KlaviyoClient;
use crate::handlers::{subscribe_handler, MailingState, Marketing};

pub fn routes(config: Arc<AppConfig>) -> Router {
    let marketing: Option<Marketing> = match KlaviyoClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Mailing not available: {}", e);
            None
        }
    };
    routes_with(config, marketing)
}

/// Same routes with an injected marketing service.
pub fn routes_with(config: Arc<AppConfig>, marketing: Option<Marketing>) -> Router {
    let state = Arc::new(MailingState { config, marketing });
    Router::new()
        .route("/subscribe", post(subscribe_handler))
        .with_state(state)
}
