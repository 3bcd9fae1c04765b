// --- File: crates/glowbook_stripe/src/pricing_test.rs ---
use crate::error::StripeError;
use crate::logic::Coupon;
use crate::pricing::{
    apply_discount, deposit_amount, discount_amount, parse_price_cents, quote, PaymentOption,
};
use proptest::prelude::*;

fn coupon(amount_off: Option<i64>, percent_off: Option<f64>) -> Coupon {
    Coupon {
        id: "co_1".into(),
        amount_off,
        percent_off,
        currency: amount_off.map(|_| "usd".to_string()),
        valid: true,
    }
}

#[test]
fn display_prices_parse_to_cents() {
    assert_eq!(parse_price_cents("$120").unwrap(), 12000);
    assert_eq!(parse_price_cents("From $95").unwrap(), 9500);
    assert_eq!(parse_price_cents("$120.50").unwrap(), 12050);
    assert_eq!(parse_price_cents("85,5 €").unwrap(), 8550);
}

#[test]
fn thousands_separators_are_not_decimal_points() {
    assert_eq!(parse_price_cents("$1,200").unwrap(), 120000);
    assert_eq!(parse_price_cents("$1,250.00").unwrap(), 125000);
    assert_eq!(parse_price_cents("From $12,500.5").unwrap(), 1250050);
    assert_eq!(parse_price_cents("12,50 €").unwrap(), 1250);
}

#[test]
fn price_without_digits_is_invalid() {
    assert!(matches!(
        parse_price_cents("Complimentary"),
        Err(StripeError::InvalidPrice(_))
    ));
}

#[test]
fn fixed_and_percent_coupons() {
    assert_eq!(discount_amount(&coupon(Some(2000), None), 12000, "usd"), Some(2000));
    assert_eq!(discount_amount(&coupon(Some(2000), None), 12000, "eur"), None);
    assert_eq!(discount_amount(&coupon(None, Some(15.0)), 12000, "usd"), Some(1800));
    assert_eq!(discount_amount(&coupon(None, None), 12000, "usd"), None);
}

#[test]
fn discount_never_goes_below_zero() {
    assert_eq!(apply_discount(5000, 8000), 0);
    assert_eq!(apply_discount(5000, -100), 5000);
}

#[test]
fn deposit_is_half_of_the_discounted_total() {
    let q = quote(12000, 2000, PaymentOption::Deposit, true).unwrap();
    assert_eq!(q.total_amount, 10000);
    assert_eq!(q.amount_due, 5000);
    assert_eq!(q.discount_amount, 2000);
    assert_eq!(deposit_amount(9999), 5000);
}

#[test]
fn deposit_requires_acknowledgment() {
    assert!(matches!(
        quote(12000, 0, PaymentOption::Deposit, false),
        Err(StripeError::DepositNotAcknowledged)
    ));
    // Acknowledgment is irrelevant when paying in full
    assert_eq!(quote(12000, 0, PaymentOption::Full, false).unwrap().amount_due, 12000);
}

proptest! {
    #[test]
    fn quote_is_bounded(base in 0i64..10_000_000, discount in -1_000i64..20_000_000, deposit in any::<bool>()) {
        let option = if deposit { PaymentOption::Deposit } else { PaymentOption::Full };
        let q = quote(base, discount, option, true).unwrap();
        prop_assert!(q.total_amount >= 0);
        prop_assert!(q.total_amount <= base);
        prop_assert_eq!(q.base_amount - q.discount_amount, q.total_amount);
        prop_assert!(q.amount_due <= q.total_amount);
        if deposit {
            prop_assert!(q.amount_due * 2 >= q.total_amount);
            prop_assert!(q.amount_due * 2 <= q.total_amount + 1);
        }
    }
}
