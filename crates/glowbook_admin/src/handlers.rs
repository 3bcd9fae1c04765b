// --- File: crates/glowbook_admin/src/handlers.rs ---
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use glowbook_cal::Scheduler;
use glowbook_common::HttpStatusCode;
use glowbook_config::{AdminConfig, AppConfig};
use glowbook_db::SqlBookingRepository;
use glowbook_hapio::HapioClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::AdminError;
use crate::session::{check_password, issue_session, removal_cookie, session_cookie};

// Shared state for the admin handlers and the auth middleware
#[derive(Clone)]
pub struct AdminState {
    pub config: Arc<AppConfig>,
    pub hapio: Option<HapioClient>,
    pub scheduler: Option<Scheduler>,
    pub bookings: Option<SqlBookingRepository>,
}

impl AdminState {
    pub(crate) fn admin_config(&self) -> Result<&AdminConfig, AdminError> {
        if !self.config.use_admin {
            return Err(AdminError::Disabled);
        }
        self.config
            .admin
            .as_ref()
            .ok_or_else(|| AdminError::ConfigError("admin section missing".to_string()))
    }

    pub(crate) fn hapio(&self) -> Result<&HapioClient, AdminError> {
        self.hapio
            .as_ref()
            .ok_or_else(|| AdminError::ConfigError("hapio section missing".to_string()))
    }

    pub(crate) fn scheduler(&self) -> Result<&Scheduler, AdminError> {
        self.scheduler
            .as_ref()
            .ok_or_else(|| AdminError::ConfigError("cal section missing".to_string()))
    }

    pub(crate) fn bookings(&self) -> Result<&SqlBookingRepository, AdminError> {
        self.bookings
            .as_ref()
            .ok_or_else(|| AdminError::ConfigError("database not configured".to_string()))
    }
}

pub(crate) fn to_response(err: AdminError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("[Admin] {}", err);
    } else {
        info!("[Admin] {}", err);
    }
    (status, err.user_message())
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginResponse {
    /// Same value as the session cookie, for clients sending `Authorization: Bearer`
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = LoginResponse),
        (status = 401, description = "Incorrect password"),
        (status = 500, description = "Admin secrets not configured"),
        (status = 503, description = "Admin area disabled")
    ),
    tag = "Admin"
))]
pub async fn login_handler(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, (StatusCode, String)> {
    let admin = state.admin_config().map_err(to_response)?;
    if let Err(e) = check_password(admin, &payload.password) {
        if matches!(e, AdminError::InvalidPassword) {
            warn!("[Admin] Failed login attempt");
        }
        return Err(to_response(e));
    }

    let (token, session) = issue_session(admin, Utc::now()).map_err(to_response)?;
    info!("[Admin] Signed in until {}", session.expires_at);
    let jar = jar.add(session_cookie(admin, &token));
    Ok((
        jar,
        Json(LoginResponse {
            token,
            expires_at: session.expires_at,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 204, description = "Session cookie cleared"),
        (status = 401, description = "Not signed in")
    ),
    tag = "Admin"
))]
pub async fn logout_handler(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), (StatusCode, String)> {
    let admin = state.admin_config().map_err(to_response)?;
    info!("[Admin] Signed out");
    Ok((StatusCode::NO_CONTENT, jar.remove(removal_cookie(admin))))
}
