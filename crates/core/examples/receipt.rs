//! Cart Receipt Example
//!
//! Fills a cart from the bundled sample catalog and prints its receipt.
//!
//! Pass a coupon code as the first argument to apply it, e.g. `WELCOME10`.

use std::{env, error::Error, io};

use jiff::Timestamp;
use storefront::{
    carts::{Cart, CartReceipt, NewCartItem, PricingPolicy},
    fixtures::Fixture,
};

fn main() -> Result<(), Box<dyn Error>> {
    let now = Timestamp::now();
    let policy = PricingPolicy::default();
    let fixture = Fixture::sample(now)?;

    let mut cart = Cart::new(None, now);

    for (slug, quantity) in [("ceramic-mug", 2), ("linen-throw", 1)] {
        let product = fixture
            .product(slug)
            .ok_or_else(|| format!("{slug} is missing from the sample catalog"))?;

        cart.add_item(NewCartItem::from_product(product, None, quantity), now, &policy)?;
    }

    if let Some(code) = env::args().nth(1) {
        let coupon = fixture
            .coupons()
            .iter()
            .find(|coupon| coupon.code.eq_ignore_ascii_case(&code))
            .ok_or_else(|| format!("unknown coupon {code}"))?;

        cart.apply_coupon(coupon, 0, now, &policy)?;
    }

    CartReceipt::new(&cart, &policy).write_to(io::stdout().lock())?;

    Ok(())
}
