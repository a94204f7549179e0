//! Cart Receipt

use std::io;

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    carts::{Cart, PricingPolicy},
    money::{MoneyFormatError, format_price},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Amount could not be formatted.
    #[error(transparent)]
    Money(#[from] MoneyFormatError),

    /// IO error
    #[error("IO error")]
    IO(#[source] io::Error),
}

/// Printable view of a cart: one row per line followed by the totals.
#[derive(Debug)]
pub struct CartReceipt<'a> {
    cart: &'a Cart,
    policy: &'a PricingPolicy,
}

impl<'a> CartReceipt<'a> {
    /// Create a receipt for the given cart.
    pub fn new(cart: &'a Cart, policy: &'a PricingPolicy) -> Self {
        Self { cart, policy }
    }

    /// Write the receipt tables to `out`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if formatting or writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.cart.is_empty() {
            writeln!(out, "Your cart is empty.").map_err(ReceiptError::IO)?;

            return Ok(());
        }

        let lines = self.lines_table()?;
        let summary = self.summary_table()?;

        writeln!(out, "\n{lines}\n{summary}").map_err(ReceiptError::IO)
    }

    fn price(&self, amount: Decimal) -> Result<String, ReceiptError> {
        Ok(format_price(amount, &self.policy.currency)?)
    }

    fn lines_table(&self) -> Result<String, ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Savings", "Total"]);

        for (idx, item) in self.cart.items.iter().enumerate() {
            let savings = if item.discount.is_zero() {
                String::new()
            } else {
                self.price(item.discount)?
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.display_name(),
                item.quantity.to_string(),
                self.price(item.unit_price)?,
                savings,
                self.price(item.total)?,
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..6), Alignment::right());

        Ok(table.to_string())
    }

    fn summary_table(&self) -> Result<String, ReceiptError> {
        let totals = &self.cart.totals;
        let mut builder = Builder::default();

        builder.push_record(["Subtotal".to_string(), self.price(totals.subtotal)?]);

        if let Some(coupon) = &self.cart.coupon {
            builder.push_record([
                format!("Coupon {}", coupon.code),
                format!("-{}", self.price(totals.coupon_discount)?),
            ]);
        }

        builder.push_record(["Tax".to_string(), self.price(totals.tax)?]);
        builder.push_record(["Shipping".to_string(), self.price(totals.shipping)?]);
        builder.push_record(["Total".to_string(), self.price(totals.total)?]);

        let savings = totals.savings(self.policy);

        if savings > Decimal::ZERO {
            builder.push_record(["You save".to_string(), self.price(savings)?]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.modify(Columns::last(), Alignment::right());

        Ok(table.to_string())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{carts::NewCartItem, products::test_support::product};

    use super::*;

    #[test]
    fn empty_cart_prints_message() -> TestResult {
        let cart = Cart::new(None, Timestamp::UNIX_EPOCH);
        let policy = PricingPolicy::default();
        let mut out = Vec::new();

        CartReceipt::new(&cart, &policy).write_to(&mut out)?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty.\n");

        Ok(())
    }

    #[test]
    fn receipt_lists_items_and_totals() -> TestResult {
        let policy = PricingPolicy::default();
        let mut cart = Cart::new(None, Timestamp::UNIX_EPOCH);
        cart.add_item(
            NewCartItem::from_product(&product("Mug", 100, 5), None, 2),
            Timestamp::UNIX_EPOCH,
            &policy,
        )?;

        let mut out = Vec::new();
        CartReceipt::new(&cart, &policy).write_to(&mut out)?;
        let printed = String::from_utf8(out)?;

        assert!(printed.contains("Mug"), "receipt should list the item");
        assert!(printed.contains("Subtotal"), "receipt should show subtotal");
        assert!(printed.contains("Shipping"), "receipt should show shipping");

        Ok(())
    }
}
