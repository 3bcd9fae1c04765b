// --- File: crates/glowbook_admin/src/auth.rs ---

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::authorization::{Authorization, Bearer};
use axum_extra::typed_header::TypedHeaderRejection;
use axum_extra::TypedHeader;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AdminError;
use crate::handlers::{to_response, AdminState};
use crate::session::{session_token, verify_session};

/// Guards admin routes: requires a valid session from the
/// `Authorization: Bearer` header or the session cookie.
pub async fn admin_auth_middleware(
    State(state): State<Arc<AdminState>>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    jar: CookieJar,
    req: Request<Body>,
    next: Next,
) -> Response {
    let admin = match state.admin_config() {
        Ok(admin) => admin,
        Err(e) => return to_response(e).into_response(),
    };

    let bearer = bearer.ok().map(|TypedHeader(auth)| auth);
    let Some(token) = session_token(bearer.as_ref(), &jar) else {
        warn!("[Admin] Request to {} without a session", req.uri().path());
        return to_response(AdminError::MissingSession).into_response();
    };

    match verify_session(admin, &token) {
        Ok(session) => {
            debug!("[Admin] Session valid until {}", session.expires_at);
            next.run(req).await
        }
        Err(e) => {
            warn!("[Admin] Rejected session for {}: {}", req.uri().path(), e);
            to_response(e).into_response()
        }
    }
}
