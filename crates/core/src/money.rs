//! Monetary amount helpers shared by the ledger and the donation recorder.
//!
//! Amounts travel through the domain as `Decimal` and are persisted as
//! integer minor units so that storage can increment totals atomically.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::{MAX_MONEY_AMOUNT, MONEY_DECIMAL_PLACES};
use crate::errors::FieldErrors;

fn max_amount() -> Decimal {
    Decimal::from_str(MAX_MONEY_AMOUNT).unwrap_or(Decimal::MAX)
}

/// Checks an amount against the platform's money rules and records any
/// failure under `field`.
///
/// `allow_zero` distinguishes goals (0 means item-based) from donations,
/// which must be strictly positive.
pub fn check_amount(errors: &mut FieldErrors, field: &str, amount: Decimal, allow_zero: bool) {
    if amount.is_sign_negative() && !amount.is_zero() {
        errors.add(field, "must not be negative");
        return;
    }
    if amount.is_zero() && !allow_zero {
        errors.add(field, "must be greater than zero");
        return;
    }
    if amount.normalize().scale() > MONEY_DECIMAL_PLACES {
        errors.add(
            field,
            format!("must have at most {} decimal places", MONEY_DECIMAL_PLACES),
        );
    }
    if amount > max_amount() {
        errors.add(field, format!("must not exceed {}", MAX_MONEY_AMOUNT));
    }
}

/// Converts an amount into integer minor units (cents).
///
/// Returns `None` when the amount carries more precision than the platform
/// stores or does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    let normalized = amount.normalize();
    if normalized.scale() > MONEY_DECIMAL_PLACES {
        return None;
    }
    (normalized * Decimal::from(100)).to_i64()
}

/// Converts stored minor units back into a decimal amount with two places.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_DECIMAL_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minor_units_conversion() {
        assert_eq!(to_minor_units(dec!(10.50)), Some(1050));
        assert_eq!(to_minor_units(dec!(0.01)), Some(1));
        assert_eq!(to_minor_units(dec!(45)), Some(4500));
        assert_eq!(to_minor_units(dec!(1.005)), None);
        assert_eq!(from_minor_units(7500), dec!(75.00));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert_eq!(to_minor_units(dec!(12.3000)), Some(1230));
        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "amount", dec!(12.3000), false);
        assert!(errors.is_empty());
    }

    #[test]
    fn donation_amounts_must_be_positive() {
        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "amount", Decimal::ZERO, false);
        check_amount(&mut errors, "goal", Decimal::ZERO, true);
        assert!(errors.contains("amount"));
        assert!(!errors.contains("goal"));

        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "amount", dec!(-5), false);
        assert_eq!(errors.get("amount").unwrap()[0], "must not be negative");
    }

    #[test]
    fn amounts_are_bounded() {
        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "amount", dec!(100000000), false);
        check_amount(&mut errors, "fee", dec!(0.001), false);
        assert!(errors.contains("amount"));
        assert!(errors.contains("fee"));
    }
}
