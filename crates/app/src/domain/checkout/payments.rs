//! Payment gateway port and the simulated processor.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use storefront::payments::{Payment, PaymentMethod, PaymentStatus, PaymentUuid};
use thiserror::Error;
use tracing::{info, warn};

/// Card token the simulated processor always declines.
pub const DECLINED_TOKEN: &str = "tok_declined";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment was declined")]
    Declined(String),

    #[error("cannot charge {0}")]
    InvalidAmount(Decimal),
}

impl PaymentError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Declined(_) => "payment_declined",
            Self::InvalidAmount(_) => "payment_invalid_amount",
        }
    }
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` to the payment method.
    async fn charge(
        &self,
        amount: Decimal,
        currency: &str,
        method: &PaymentMethod,
    ) -> Result<Payment, PaymentError>;
}

/// In-process processor. Cards are captured immediately, cash on delivery is
/// authorised, and listed card tokens are declined.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
    declined_tokens: FxHashSet<String>,
}

impl Default for SimulatedPaymentGateway {
    fn default() -> Self {
        Self::new([DECLINED_TOKEN])
    }
}

impl SimulatedPaymentGateway {
    #[must_use]
    pub fn new<I, S>(declined_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declined_tokens: declined_tokens.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn charge(
        &self,
        amount: Decimal,
        currency: &str,
        method: &PaymentMethod,
    ) -> Result<Payment, PaymentError> {
        if amount.is_sign_negative() {
            return Err(PaymentError::InvalidAmount(amount));
        }

        let uuid = PaymentUuid::new();
        let reference = format!("pay_{}", uuid.into_uuid().simple());

        let status = match method {
            PaymentMethod::Card { token, .. } if self.declined_tokens.contains(token) => {
                warn!(%reference, "card declined");
                return Err(PaymentError::Declined(reference));
            }
            PaymentMethod::Card { .. } => PaymentStatus::Captured,
            PaymentMethod::CashOnDelivery => PaymentStatus::Authorized,
        };

        info!(%reference, %amount, currency, ?status, "charged payment");

        Ok(Payment {
            uuid,
            amount,
            currency: currency.to_string(),
            method: method.clone(),
            status,
            reference,
            created_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn card(token: &str) -> PaymentMethod {
        PaymentMethod::Card {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn cards_are_captured() -> TestResult {
        let payment = SimulatedPaymentGateway::default()
            .charge(Decimal::new(51304, 2), "MXN", &card("tok_visa"))
            .await?;

        assert_eq!(payment.status, PaymentStatus::Captured);
        assert_eq!(payment.amount, Decimal::new(51304, 2));
        assert_eq!(payment.currency, "MXN");
        assert!(payment.reference.starts_with("pay_"));
        assert!(payment.is_successful());

        Ok(())
    }

    #[tokio::test]
    async fn cash_on_delivery_is_authorised() -> TestResult {
        let payment = SimulatedPaymentGateway::default()
            .charge(Decimal::ONE_HUNDRED, "MXN", &PaymentMethod::CashOnDelivery)
            .await?;

        assert_eq!(payment.status, PaymentStatus::Authorized);

        Ok(())
    }

    #[tokio::test]
    async fn listed_tokens_are_declined() {
        let gateway = SimulatedPaymentGateway::new(["tok_stolen"]);

        let declined = gateway
            .charge(Decimal::ONE, "MXN", &card("tok_stolen"))
            .await;
        assert!(
            matches!(declined, Err(PaymentError::Declined(_))),
            "expected Declined, got {declined:?}"
        );

        let default_declined = SimulatedPaymentGateway::default()
            .charge(Decimal::ONE, "MXN", &card(DECLINED_TOKEN))
            .await;
        assert!(
            matches!(&default_declined, Err(error) if error.code() == "payment_declined"),
            "expected payment_declined, got {default_declined:?}"
        );
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected() {
        let result = SimulatedPaymentGateway::default()
            .charge(Decimal::NEGATIVE_ONE, "MXN", &card("tok_visa"))
            .await;

        assert!(
            matches!(result, Err(PaymentError::InvalidAmount(_))),
            "expected InvalidAmount, got {result:?}"
        );
    }
}
