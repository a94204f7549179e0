//! Money
//!
//! Amounts are carried as [`Decimal`] in major units (e.g. `1299.50`) and only
//! turned into [`rusty_money::Money`] for display.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Errors formatting an amount for display.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyFormatError {
    /// The currency code is not a known ISO-4217 currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Round an amount to cents, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Floor an amount at zero.
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Look up an ISO-4217 currency by its alpha code.
///
/// # Errors
///
/// Returns [`MoneyFormatError::UnknownCurrency`] when the code is not recognised.
pub fn find_currency(code: &str) -> Result<&'static iso::Currency, MoneyFormatError> {
    iso::find(&code.to_ascii_uppercase())
        .ok_or_else(|| MoneyFormatError::UnknownCurrency(code.to_string()))
}

/// Format an amount in the given currency, e.g. `$1,299.50`.
///
/// # Errors
///
/// Returns [`MoneyFormatError::UnknownCurrency`] when the code is not recognised.
pub fn format_price(amount: Decimal, currency_code: &str) -> Result<String, MoneyFormatError> {
    let currency = find_currency(currency_code)?;

    Ok(Money::from_decimal(round_money(amount), currency).to_string())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn round_money_rounds_midpoint_away_from_zero() {
        assert_eq!(round_money(Decimal::new(10_005, 3)), Decimal::new(1_001, 2));
        assert_eq!(round_money(Decimal::new(10_004, 3)), Decimal::new(1_000, 2));
    }

    #[test]
    fn clamp_non_negative_floors_at_zero() {
        assert_eq!(clamp_non_negative(Decimal::new(-5, 0)), Decimal::ZERO);
        assert_eq!(clamp_non_negative(Decimal::new(5, 0)), Decimal::new(5, 0));
    }

    #[test]
    fn format_price_uses_currency_symbol() -> TestResult {
        let formatted = format_price(Decimal::new(129_950, 2), "usd")?;

        assert_eq!(formatted, "$1,299.50");

        Ok(())
    }

    #[test]
    fn format_price_rejects_unknown_currency() {
        let result = format_price(Decimal::ONE, "XXX1");

        assert_eq!(
            result,
            Err(MoneyFormatError::UnknownCurrency("XXX1".to_string()))
        );
    }
}
