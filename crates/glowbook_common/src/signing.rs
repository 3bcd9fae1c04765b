//! HS256 JSON web tokens for booking tokens and admin sessions.
//!
//! The caller's claims are flattened next to the registered `iat`/`exp`
//! claims; expiry is enforced by `jsonwebtoken::Validation` with no leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Signing secret is empty or unusable")]
    InvalidSecret,
    #[error("Token is malformed")]
    Malformed,
    #[error("Token signature does not match")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token could not be encoded: {0}")]
    Encoding(JwtError),
}

impl From<JwtError> for SigningError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => SigningError::Expired,
            ErrorKind::InvalidSignature => SigningError::BadSignature,
            ErrorKind::InvalidKeyFormat => SigningError::InvalidSecret,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => SigningError::Malformed,
            _ => SigningError::Encoding(err),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Registered<T> {
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    claims: T,
}

fn check_secret(secret: &[u8]) -> Result<(), SigningError> {
    if secret.is_empty() {
        return Err(SigningError::InvalidSecret);
    }
    Ok(())
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat"]);
    validation
}

/// Signs `claims` so they are valid from `now` for `ttl`.
pub fn sign_claims<T: Serialize>(
    secret: &[u8],
    claims: &T,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<String, SigningError> {
    check_secret(secret)?;
    let registered = Registered {
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        claims,
    };
    Ok(encode(
        &Header::new(Algorithm::HS256),
        &registered,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Verifies signature and expiry against the current time, returning the
/// embedded claims.
pub fn verify_claims<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T, SigningError> {
    check_secret(secret)?;
    let data = decode::<Registered<T>>(
        token.trim(),
        &DecodingKey::from_secret(secret),
        &validation(),
    )?;
    Ok(data.claims.claims)
}
