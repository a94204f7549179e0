//! Payments

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Payment UUID
pub type PaymentUuid = TypedUuid<Payment>;

/// How the customer pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Tokenised card
    Card {
        /// Card network, e.g. "visa"
        brand: String,
        /// Last four digits
        last4: String,
        /// Processor token
        token: String,
    },

    /// Paid on delivery
    CashOnDelivery,
}

impl PaymentMethod {
    /// Short label for summaries, e.g. "visa •••• 4242".
    pub fn label(&self) -> String {
        match self {
            Self::Card { brand, last4, .. } => format!("{brand} •••• {last4}"),
            Self::CashOnDelivery => "cash on delivery".to_string(),
        }
    }
}

/// Payment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting processing
    Pending,

    /// Funds reserved
    Authorized,

    /// Funds taken
    Captured,

    /// Rejected by the processor
    Declined,

    /// Returned to the customer
    Refunded,
}

/// Payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment UUID
    pub uuid: PaymentUuid,

    /// Amount charged
    pub amount: Decimal,

    /// ISO-4217 currency code
    pub currency: String,

    /// Method used
    pub method: PaymentMethod,

    /// Lifecycle state
    pub status: PaymentStatus,

    /// Processor reference
    pub reference: String,

    /// Creation time
    pub created_at: Timestamp,
}

impl Payment {
    /// Whether the payment went through.
    pub fn is_successful(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Authorized | PaymentStatus::Captured
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_label_masks_number() {
        let card = PaymentMethod::Card {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            token: "tok_visa".to_string(),
        };

        assert_eq!(card.label(), "visa •••• 4242");
        assert_eq!(PaymentMethod::CashOnDelivery.label(), "cash on delivery");
    }

    #[test]
    fn only_authorized_or_captured_is_successful() {
        let mut payment = Payment {
            uuid: PaymentUuid::new(),
            amount: Decimal::ONE,
            currency: "MXN".to_string(),
            method: PaymentMethod::CashOnDelivery,
            status: PaymentStatus::Captured,
            reference: "ref".to_string(),
            created_at: Timestamp::UNIX_EPOCH,
        };

        assert!(payment.is_successful());

        payment.status = PaymentStatus::Declined;
        assert!(!payment.is_successful());
    }
}
