//! Coupons Repository

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use storefront::{
    coupons::{Coupon, normalize_code},
    users::UserUuid,
};
use tracing::debug;

use crate::storage::{
    DocumentStore, StorageError,
    documents::{get_document, set_document},
};

const COUPONS: &str = "coupons";
const REDEMPTIONS: &str = "coupon_redemptions";

#[automock]
#[async_trait]
pub trait CouponsRepository: Send + Sync {
    /// Find a coupon by code (case-insensitive).
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StorageError>;

    /// Create or replace a coupon.
    async fn save(&self, coupon: &Coupon) -> Result<(), StorageError>;

    /// Count a redemption against the coupon and, when known, the user.
    async fn record_redemption(
        &self,
        code: &str,
        user: Option<UserUuid>,
    ) -> Result<(), StorageError>;

    /// Times the user has redeemed the coupon.
    async fn user_redemptions(&self, code: &str, user: UserUuid) -> Result<u32, StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Redemptions {
    count: u32,
}

/// Coupons stored in the remote document store, keyed by normalised code.
#[derive(Clone)]
pub struct RemoteCouponsRepository {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for RemoteCouponsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCouponsRepository").finish_non_exhaustive()
    }
}

impl RemoteCouponsRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store every coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub async fn seed(&self, coupons: &[Coupon]) -> Result<(), StorageError> {
        for coupon in coupons {
            self.save(coupon).await?;
        }

        debug!(count = coupons.len(), "seeded coupons");

        Ok(())
    }
}

fn redemption_id(code: &str, user: UserUuid) -> String {
    format!("{}:{user}", normalize_code(code))
}

#[async_trait]
impl CouponsRepository for RemoteCouponsRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StorageError> {
        get_document(self.store.as_ref(), COUPONS, &normalize_code(code)).await
    }

    async fn save(&self, coupon: &Coupon) -> Result<(), StorageError> {
        set_document(
            self.store.as_ref(),
            COUPONS,
            &normalize_code(&coupon.code),
            coupon,
        )
        .await
    }

    async fn record_redemption(
        &self,
        code: &str,
        user: Option<UserUuid>,
    ) -> Result<(), StorageError> {
        if let Some(mut coupon) = self.find_by_code(code).await? {
            coupon.usage_count = coupon.usage_count.saturating_add(1);
            self.save(&coupon).await?;
        }

        if let Some(user) = user {
            let id = redemption_id(code, user);

            let mut redemptions: Redemptions = get_document(self.store.as_ref(), REDEMPTIONS, &id)
                .await?
                .unwrap_or_default();

            redemptions.count = redemptions.count.saturating_add(1);

            set_document(self.store.as_ref(), REDEMPTIONS, &id, &redemptions).await?;
        }

        debug!(code, ?user, "recorded coupon redemption");

        Ok(())
    }

    async fn user_redemptions(&self, code: &str, user: UserUuid) -> Result<u32, StorageError> {
        let redemptions: Option<Redemptions> =
            get_document(self.store.as_ref(), REDEMPTIONS, &redemption_id(code, user)).await?;

        Ok(redemptions.map_or(0, |r| r.count))
    }
}
