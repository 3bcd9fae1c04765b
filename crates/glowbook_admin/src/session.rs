// --- File: crates/glowbook_admin/src/session.rs ---
//! Admin sessions: password check, signed session tokens and the cookie that
//! carries them.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::headers::authorization::{Authorization, Bearer};
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use glowbook_common::{sign_claims, verify_claims};
use glowbook_config::{AdminConfig, SECRET_MARKER};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AdminError;

pub const SESSION_COOKIE: &str = "glowbook_admin";

/// Claims inside an admin session token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn configured(value: &str, name: &str) -> Result<(), AdminError> {
    if value.is_empty() || value == SECRET_MARKER {
        return Err(AdminError::ConfigError(format!("admin.{} is not set", name)));
    }
    Ok(())
}

/// Compares digests so neither content nor length leaks through timing.
pub fn check_password(config: &AdminConfig, provided: &str) -> Result<(), AdminError> {
    configured(&config.password, "password")?;
    let expected = Sha256::digest(config.password.as_bytes());
    let provided = Sha256::digest(provided.as_bytes());
    if constant_time_eq(&expected, &provided) {
        Ok(())
    } else {
        Err(AdminError::InvalidPassword)
    }
}

fn session_ttl(config: &AdminConfig) -> Duration {
    Duration::hours(config.session_hours.max(1))
}

pub fn issue_session(
    config: &AdminConfig,
    now: DateTime<Utc>,
) -> Result<(String, AdminSession), AdminError> {
    configured(&config.session_secret, "session_secret")?;
    let ttl = session_ttl(config);
    let session = AdminSession {
        subject: "admin".to_string(),
        issued_at: now,
        expires_at: now + ttl,
    };
    let token = sign_claims(config.session_secret.as_bytes(), &session, now, ttl)?;
    Ok((token, session))
}

pub fn verify_session(config: &AdminConfig, token: &str) -> Result<AdminSession, AdminError> {
    configured(&config.session_secret, "session_secret")?;
    Ok(verify_claims(config.session_secret.as_bytes(), token)?)
}

/// Bearer token first, then the session cookie.
pub fn session_token(bearer: Option<&Authorization<Bearer>>, jar: &CookieJar) -> Option<String> {
    if let Some(token) = bearer.map(|b| b.token().trim()).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn base_cookie(config: &AdminConfig, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.cookie_secure)
        .build()
}

pub fn session_cookie(config: &AdminConfig, token: &str) -> Cookie<'static> {
    let mut cookie = base_cookie(config, token.to_string());
    cookie.set_max_age(time::Duration::seconds(session_ttl(config).num_seconds()));
    cookie
}

/// The cookie handed to `CookieJar::remove`; it carries the same attributes
/// as the session cookie so browsers drop the right one.
pub fn removal_cookie(config: &AdminConfig) -> Cookie<'static> {
    base_cookie(config, String::new())
}
