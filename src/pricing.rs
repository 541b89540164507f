//! Markup-based pricing for imported products.
//!
//! A product's selling price is always derived from its supplier cost and the
//! seller's markup percentage, rounded to cents the same way PostgreSQL's
//! `ROUND(numeric, 2)` does so bulk SQL updates agree with single updates.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{AppError, AppResult};

pub const DEFAULT_MARKUP_PERCENTAGE: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Largest markup that fits a `NUMERIC(5,2)` column.
pub const MAX_MARKUP_PERCENTAGE: Decimal = Decimal::from_parts(99999, 0, 0, false, 2);

/// Largest amount that fits a `NUMERIC(10,2)` column.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Rounds to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn selling_price(cost: Decimal, markup_percentage: Decimal) -> Decimal {
    let multiplier = Decimal::ONE + markup_percentage / Decimal::ONE_HUNDRED;
    round_money(cost * multiplier)
}

/// Like [`selling_price`], but rejects results that do not fit the price column.
pub fn checked_selling_price(cost: Decimal, markup_percentage: Decimal) -> AppResult<Decimal> {
    let price = selling_price(cost, markup_percentage);
    if price > MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "selling price must not exceed {MAX_PRICE}"
        )));
    }
    Ok(price)
}

/// Returns the cost as stored: rounded to cents and within the column range.
pub fn validate_cost(cost: Decimal) -> AppResult<Decimal> {
    let cost = round_money(cost);
    if cost <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "cost price must be greater than 0".into(),
        ));
    }
    if cost > MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "cost price must not exceed {MAX_PRICE}"
        )));
    }
    Ok(cost)
}

pub fn validate_markup(markup_percentage: Decimal) -> AppResult<()> {
    if markup_percentage < Decimal::ZERO || markup_percentage > MAX_MARKUP_PERCENTAGE {
        return Err(AppError::BadRequest(format!(
            "markup percentage must be between 0 and {MAX_MARKUP_PERCENTAGE}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn default_markup_adds_thirty_percent() {
        assert_eq!(DEFAULT_MARKUP_PERCENTAGE, dec("30"));
        assert_eq!(selling_price(dec("10.00"), DEFAULT_MARKUP_PERCENTAGE), dec("13.00"));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 19.99 * 1.25 = 24.9875
        assert_eq!(selling_price(dec("19.99"), dec("25")), dec("24.99"));
        // 0.05 * 1.5 = 0.075
        assert_eq!(selling_price(dec("0.05"), dec("50")), dec("0.08"));
    }

    #[test]
    fn zero_markup_keeps_cost() {
        assert_eq!(selling_price(dec("7.35"), Decimal::ZERO), dec("7.35"));
    }

    #[test]
    fn fractional_markup() {
        assert_eq!(selling_price(dec("100"), dec("12.5")), dec("112.50"));
    }

    #[test]
    fn rejects_out_of_range_markup() {
        assert!(validate_markup(dec("-1")).is_err());
        assert!(validate_markup(dec("1000")).is_err());
        assert!(validate_markup(dec("999.99")).is_ok());
        assert!(validate_markup(Decimal::ZERO).is_ok());
        assert_eq!(MAX_MARKUP_PERCENTAGE, dec("999.99"));
    }

    #[test]
    fn rejects_non_positive_cost() {
        assert!(validate_cost(Decimal::ZERO).is_err());
        assert!(validate_cost(dec("-3")).is_err());
        assert!(validate_cost(dec("0.004")).is_err());
        assert_eq!(validate_cost(dec("0.01")).unwrap(), dec("0.01"));
    }

    #[test]
    fn cost_is_rounded_to_cents_before_pricing() {
        let cost = validate_cost(dec("10.005")).unwrap();
        assert_eq!(cost, dec("10.01"));
        // Same result the bulk SQL update gets from the stored NUMERIC(10,2) cost.
        assert_eq!(selling_price(cost, dec("30")), dec("13.01"));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        assert_eq!(MAX_PRICE, dec("99999999.99"));
        assert!(validate_cost(dec("99999999.99")).is_ok());
        assert!(matches!(
            validate_cost(dec("100000000")),
            Err(AppError::BadRequest(_))
        ));
        assert!(checked_selling_price(dec("99999999.99"), dec("30")).is_err());
        assert_eq!(
            checked_selling_price(dec("10"), dec("30")).unwrap(),
            dec("13.00")
        );
    }

    #[test]
    fn money_rounding_is_half_away_from_zero() {
        assert_eq!(round_money(dec("2.345")), dec("2.35"));
        assert_eq!(round_money(dec("2.355")), dec("2.36"));
    }
}
