// --- File: crates/services/glowbook_backend/src/app.rs ---
//! Router assembly: every enabled feature crate is mounted under `/api`.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use glowbook_config::AppConfig;
use glowbook_db::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Clone)]
pub struct HealthState {
    pub db: Option<DbClient>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    /// `ok`, `unavailable` or `disabled`
    pub database: String,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Glowbook"
))]
pub async fn health_handler(
    State(state): State<Arc<HealthState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, database) = match &state.db {
        None => (StatusCode::OK, "ok", "disabled"),
        Some(db) => {
            if db.is_healthy().await {
                (StatusCode::OK, "ok", "ok")
            } else {
                warn!("Health check: database unreachable");
                (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
            }
        }
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            database: database.to_string(),
        }),
    )
}

#[cfg(feature = "openapi")]
fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Glowbook API",
            version = "0.1.0",
            description = "Studio booking API: availability, holds, payments and admin",
            license(name = "MIT", url = "https://opensource.org/licenses/MIT")
        ),
        paths(health_handler),
        components(schemas(HealthResponse)),
        tags((name = "Glowbook", description = "Core service endpoints")),
        servers((url = "/api", description = "Main API Prefix")),
    )]
    struct ApiDoc;

    #[allow(unused_mut)]
    let mut openapi_doc = ApiDoc::openapi();
    #[cfg(feature = "cal")]
    openapi_doc.merge(glowbook_cal::doc::CalApiDoc::openapi());
    #[cfg(feature = "hapio")]
    openapi_doc.merge(glowbook_hapio::doc::HapioApiDoc::openapi());
    #[cfg(feature = "stripe")]
    openapi_doc.merge(glowbook_stripe::doc::StripeApiDoc::openapi());
    #[cfg(feature = "mailing")]
    openapi_doc.merge(glowbook_mailing::doc::MailingApiDoc::openapi());
    #[cfg(feature = "booking")]
    openapi_doc.merge(glowbook_booking::doc::BookingApiDoc::openapi());
    #[cfg(feature = "admin")]
    openapi_doc.merge(glowbook_admin::doc::AdminApiDoc::openapi());

    info!("Adding Swagger UI at /api/docs");
    SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc)
}

/// Builds the whole application. `db` is `None` when the database is
/// disabled or could not be reached at startup.
#[allow(unused_variables)]
pub fn build_router(config: Arc<AppConfig>, db: Option<DbClient>) -> Router {
    let bookings = db.clone().map(glowbook_db::SqlBookingRepository::new);

    #[allow(unused_mut)]
    let mut api = Router::new()
        .route("/health", get(health_handler))
        .with_state(Arc::new(HealthState { db }));

    #[cfg(feature = "cal")]
    {
        api = api.merge(glowbook_cal::routes(config.clone()));
    }
    #[cfg(feature = "hapio")]
    {
        api = api.merge(glowbook_hapio::routes(config.clone()));
    }
    #[cfg(feature = "stripe")]
    {
        api = api.merge(glowbook_stripe::routes(config.clone(), bookings.clone()));
    }
    #[cfg(feature = "mailing")]
    {
        api = api.merge(glowbook_mailing::routes(config.clone()));
    }
    #[cfg(feature = "booking")]
    {
        api = api.merge(glowbook_booking::routes(config.clone(), bookings.clone()));
    }
    #[cfg(feature = "admin")]
    {
        api = api.merge(glowbook_admin::routes(config.clone(), bookings.clone()));
    }

    #[allow(unused_mut)]
    let mut app = Router::new().nest("/api", api);

    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_ui());
    }

    app.layer(TraceLayer::new_for_http())
}
