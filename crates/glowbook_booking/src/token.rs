// --- File: crates/glowbook_booking/src/token.rs ---
//! Booking tokens: everything needed to create the booking once payment
//! succeeded, signed so the browser can carry it to the verification page.

use chrono::{DateTime, Duration, Utc};
use glowbook_common::{sign_claims, verify_claims};
use glowbook_config::BookingConfig;
use glowbook_stripe::PaymentOption;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::BookingError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingClaims {
    pub payment_intent_id: String,
    pub event_type_id: i64,
    pub slot_start: DateTime<Utc>,
    pub timezone: String,
    pub reservation_id: Option<String>,
    pub service_id: String,
    pub service_name: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    /// Amount charged, in the smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub payment_option: PaymentOption,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn token_secret(config: &BookingConfig) -> Result<&[u8], BookingError> {
    if config.token_secret.is_empty() || config.token_secret == glowbook_config::SECRET_MARKER {
        return Err(BookingError::ConfigError(
            "booking token secret is not set".to_string(),
        ));
    }
    Ok(config.token_secret.as_bytes())
}

/// Stamps `issued_at`/`expires_at` on the claims and signs them.
pub fn issue_token(
    config: &BookingConfig,
    mut claims: BookingClaims,
    now: DateTime<Utc>,
) -> Result<(String, BookingClaims), BookingError> {
    let ttl = Duration::minutes(config.token_ttl_minutes.max(1));
    claims.issued_at = now;
    claims.expires_at = now + ttl;
    let token = sign_claims(token_secret(config)?, &claims, now, ttl)?;
    Ok((token, claims))
}

/// Verifies signature and expiry and returns the claims.
pub fn read_token(config: &BookingConfig, token: &str) -> Result<BookingClaims, BookingError> {
    Ok(verify_claims(token_secret(config)?, token)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use glowbook_common::{HttpStatusCode, SigningError};

    fn config() -> BookingConfig {
        BookingConfig {
            token_secret: "test-token-secret".into(),
            token_ttl_minutes: 30,
            verify_url: "https://studio.example/booking/verify".into(),
        }
    }

    fn claims() -> BookingClaims {
        let start = Utc.with_ymd_and_hms(2030, 7, 16, 17, 0, 0).unwrap();
        BookingClaims {
            payment_intent_id: "pi_1".into(),
            event_type_id: 1203456,
            slot_start: start,
            timezone: "America/Los_Angeles".into(),
            reservation_id: Some("res-1".into()),
            service_id: "svc_1".into(),
            service_name: "Signature Facial".into(),
            name: "Dana Reyes".into(),
            email: "dana@example.com".into(),
            phone: None,
            notes: None,
            amount: 12000,
            currency: "usd".into(),
            payment_option: PaymentOption::Full,
            issued_at: start,
            expires_at: start,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn issued_token_round_trips_with_timestamps() {
        let issued_at = now();
        let (token, issued) = issue_token(&config(), claims(), issued_at).unwrap();
        assert_eq!(issued.issued_at, issued_at);
        assert_eq!(issued.expires_at, issued_at + Duration::minutes(30));
        assert_eq!(read_token(&config(), &token).unwrap(), issued);
    }

    #[test]
    fn expired_token_maps_to_gone() {
        let (token, _) = issue_token(&config(), claims(), now() - Duration::minutes(31)).unwrap();
        let err = read_token(&config(), &token).unwrap_err();
        assert!(matches!(err, BookingError::Token(SigningError::Expired)));
        assert_eq!(err.status_code(), 410);
    }

    #[test]
    fn token_signed_with_another_secret_is_unauthorized() {
        let (token, _) = issue_token(&config(), claims(), now()).unwrap();
        let mut other = config();
        other.token_secret = "another-secret".into();
        let err = read_token(&other, &token).unwrap_err();
        assert!(matches!(err, BookingError::Token(SigningError::BadSignature)));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn unresolved_secret_is_a_config_error() {
        let mut cfg = config();
        cfg.token_secret = glowbook_config::SECRET_MARKER.into();
        assert!(matches!(
            issue_token(&cfg, claims(), now()),
            Err(BookingError::ConfigError(_))
        ));
    }
}
