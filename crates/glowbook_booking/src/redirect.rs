// --- File: crates/glowbook_booking/src/redirect.rs ---
use crate::error::BookingError;
use crate::token::BookingClaims;

/// Builds the verification page URL the browser is sent to after payment.
///
/// Empty optional fields are left out of the query string.
pub fn verification_url(
    base_url: &str,
    token: &str,
    claims: &BookingClaims,
) -> Result<String, BookingError> {
    let slot = claims.slot_start.to_rfc3339();
    let mut params: Vec<(&str, &str)> = vec![
        ("token", token),
        ("payment_intent_id", &claims.payment_intent_id),
        ("slot", &slot),
        ("name", &claims.name),
        ("email", &claims.email),
    ];
    let optional = [
        ("phone", claims.phone.as_deref()),
        ("notes", claims.notes.as_deref()),
        ("reservation_id", claims.reservation_id.as_deref()),
    ];
    params.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v))),
    );

    let query =
        serde_urlencoded::to_string(&params).map_err(|e| BookingError::Redirect(e.to_string()))?;
    let separator = if base_url.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", base_url, separator, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use glowbook_stripe::PaymentOption;

    fn claims() -> BookingClaims {
        let start = Utc.with_ymd_and_hms(2030, 7, 16, 17, 0, 0).unwrap();
        BookingClaims {
            payment_intent_id: "pi_1".into(),
            event_type_id: 1,
            slot_start: start,
            timezone: "America/Los_Angeles".into(),
            reservation_id: Some("res-1".into()),
            service_id: "svc_1".into(),
            service_name: "Signature Facial".into(),
            name: "Dana Reyes".into(),
            email: "dana+spa@example.com".into(),
            phone: None,
            notes: Some("".into()),
            amount: 6000,
            currency: "usd".into(),
            payment_option: PaymentOption::Deposit,
            issued_at: start,
            expires_at: start,
        }
    }

    #[test]
    fn query_is_encoded_and_skips_empty_fields() {
        let url = verification_url("https://studio.example/verify", "abc.def", &claims()).unwrap();
        assert_eq!(
            url,
            "https://studio.example/verify?token=abc.def&payment_intent_id=pi_1\
             &slot=2030-07-16T17%3A00%3A00%2B00%3A00&name=Dana+Reyes\
             &email=dana%2Bspa%40example.com&reservation_id=res-1"
        );
    }

    #[test]
    fn existing_query_string_is_extended() {
        let url = verification_url("https://studio.example/verify?lang=en", "t", &claims()).unwrap();
        assert!(url.starts_with("https://studio.example/verify?lang=en&token=t&"));
    }
}
