// --- File: crates/glowbook_stripe/src/pricing.rs ---
//! Amount computation for a booking payment.
//!
//! Amounts are integers in the smallest currency unit. The order is fixed:
//! catalog price, minus discount (never below zero), then halved for a
//! deposit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::StripeError;
use crate::logic::Coupon;

/// Either a comma-grouped amount (`1,250.00`) or a plain one whose comma,
/// if any, is the decimal separator (`85,5`).
static PRICE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<grouped>\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?)|(?P<plain>\d+(?:[.,]\d{1,2})?)")
        .expect("price regex is valid")
});

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum PaymentOption {
    #[default]
    Full,
    /// Half now, the balance at the appointment
    Deposit,
}

impl PaymentOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOption::Full => "full",
            PaymentOption::Deposit => "deposit",
        }
    }
}

/// The breakdown charged for one booking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PriceQuote {
    pub base_amount: i64,
    pub discount_amount: i64,
    /// Price after discount
    pub total_amount: i64,
    /// What is charged now: the total, or the deposit
    pub amount_due: i64,
    pub payment_option: PaymentOption,
}

/// Extracts the first amount from a display price: `"From $95"` is 9500,
/// `"$120.50"` is 12050, `"$1,200"` is 120000, `"85,5 €"` is 8550.
pub fn parse_price_cents(display: &str) -> Result<i64, StripeError> {
    let captures = PRICE_AMOUNT
        .captures(display)
        .ok_or_else(|| StripeError::InvalidPrice(format!("no amount in '{}'", display)))?;
    let normalized = match (captures.name("grouped"), captures.name("plain")) {
        (Some(grouped), _) => grouped.as_str().replace(',', ""),
        (None, Some(plain)) => plain.as_str().replace(',', "."),
        (None, None) => {
            return Err(StripeError::InvalidPrice(format!("no amount in '{}'", display)))
        }
    };
    let (whole, fraction) = match normalized.split_once('.') {
        Some((w, f)) => (w, f),
        None => (normalized.as_str(), ""),
    };
    let whole: i64 = whole
        .parse()
        .map_err(|_| StripeError::InvalidPrice(format!("amount too large in '{}'", display)))?;
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction.parse::<i64>().unwrap_or(0),
    };
    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(|| StripeError::InvalidPrice(format!("amount too large in '{}'", display)))
}

/// Cents a coupon takes off `amount`. `None` when a fixed-amount coupon is
/// in another currency.
pub fn discount_amount(coupon: &Coupon, amount: i64, currency: &str) -> Option<i64> {
    if let Some(off) = coupon.amount_off {
        let same_currency = coupon
            .currency
            .as_deref()
            .map_or(true, |c| c.eq_ignore_ascii_case(currency));
        return same_currency.then_some(off.max(0));
    }
    let percent = coupon.percent_off?.clamp(0.0, 100.0);
    Some(((amount as f64) * percent / 100.0).round() as i64)
}

/// Subtracts a discount without going below zero.
pub fn apply_discount(amount: i64, discount: i64) -> i64 {
    amount.saturating_sub(discount.max(0)).max(0)
}

/// Half of `total`, rounded up to the next cent.
pub fn deposit_amount(total: i64) -> i64 {
    (total + 1) / 2
}

/// Builds the quote for a booking. A deposit is only allowed once the client
/// acknowledged that the balance is due at the appointment.
pub fn quote(
    base_amount: i64,
    discount: i64,
    payment_option: PaymentOption,
    deposit_acknowledged: bool,
) -> Result<PriceQuote, StripeError> {
    if base_amount < 0 {
        return Err(StripeError::InvalidPrice("negative price".to_string()));
    }
    let total_amount = apply_discount(base_amount, discount);
    let amount_due = match payment_option {
        PaymentOption::Full => total_amount,
        PaymentOption::Deposit if !deposit_acknowledged => {
            return Err(StripeError::DepositNotAcknowledged)
        }
        PaymentOption::Deposit => deposit_amount(total_amount),
    };
    Ok(PriceQuote {
        base_amount,
        discount_amount: base_amount - total_amount,
        total_amount,
        amount_due,
        payment_option,
    })
}
