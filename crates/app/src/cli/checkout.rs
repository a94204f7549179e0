use clap::Args;
use storefront::{
    money::format_price,
    payments::PaymentMethod,
    users::{Address, AddressUuid},
};
use storefront_app::context::AppContext;

use super::report;

/// Ship the current cart to one address and pay for it in one go.
#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Recipient full name
    #[arg(long)]
    recipient: String,

    /// Street and number
    #[arg(long)]
    line1: String,

    /// Apartment or suite
    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    /// State or province
    #[arg(long)]
    state: String,

    #[arg(long)]
    postal_code: String,

    /// ISO country code
    #[arg(long, default_value = "MX")]
    country: String,

    /// Card token from the payment provider
    #[arg(long, required_unless_present = "cash_on_delivery")]
    card_token: Option<String>,

    #[arg(long, default_value = "visa")]
    card_brand: String,

    /// Last four digits of the card
    #[arg(long, default_value = "4242")]
    card_last4: String,

    /// Pay the courier instead of by card
    #[arg(long, conflicts_with = "card_token")]
    cash_on_delivery: bool,
}

impl CheckoutArgs {
    fn address(&self) -> Address {
        Address {
            uuid: AddressUuid::new(),
            label: "Shipping".to_string(),
            recipient: self.recipient.clone(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: None,
        }
    }

    fn payment_method(&self) -> PaymentMethod {
        match &self.card_token {
            Some(token) if !self.cash_on_delivery => PaymentMethod::Card {
                brand: self.card_brand.clone(),
                last4: self.card_last4.clone(),
                token: token.clone(),
            },
            _ => PaymentMethod::CashOnDelivery,
        }
    }
}

pub(crate) async fn run(ctx: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let user = ctx.auth.current().map(|user| user.uuid);

    ctx.checkout
        .set_shipping_address(args.address())
        .await
        .map_err(|error| report(&error))?;

    ctx.checkout
        .set_payment_method(args.payment_method())
        .await
        .map_err(|error| report(&error))?;

    let order = ctx
        .checkout
        .place_order(user)
        .await
        .map_err(|error| report(&error))?;

    let total = format_price(order.totals.total, &ctx.policy.currency)
        .map_err(|error| report(&error))?;

    println!("order_number: {}", order.number);
    println!("items: {}", order.item_count());
    println!("total: {total}");
    println!("payment_reference: {}", order.payment.reference);

    Ok(())
}
