//! Test Helpers

use jiff::Timestamp;
use storefront::{
    fixtures::{Fixture, FixtureError},
    payments::PaymentMethod,
    products::Product,
    users::{Address, AddressUuid, User, UserRole, UserUuid},
};
use testresult::TestResult;

use crate::test::TestContext;

pub(crate) fn sample_fixture() -> Result<Fixture, FixtureError> {
    Fixture::sample(Timestamp::UNIX_EPOCH)
}

pub(crate) async fn product_by_slug(ctx: &TestContext, slug: &str) -> TestResult<Product> {
    let product = ctx.products.get_by_slug(slug).await?;

    Ok(product.ok_or(format!("{slug} missing from the sample catalog"))?)
}

pub(crate) fn customer(email: &str) -> User {
    User {
        uuid: UserUuid::new(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        phone: None,
        role: UserRole::User,
        email_verified: true,
        addresses: Vec::new(),
        default_address: None,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn address(label: &str) -> Address {
    Address {
        uuid: AddressUuid::new(),
        label: label.to_string(),
        recipient: "Ana López".to_string(),
        line1: "Av. Insurgentes Sur 1602".to_string(),
        line2: Some("Piso 4".to_string()),
        city: "Ciudad de México".to_string(),
        state: "CDMX".to_string(),
        postal_code: "03940".to_string(),
        country: "MX".to_string(),
        phone: None,
    }
}

pub(crate) fn card(token: &str) -> PaymentMethod {
    PaymentMethod::Card {
        brand: "visa".to_string(),
        last4: "4242".to_string(),
        token: token.to_string(),
    }
}
