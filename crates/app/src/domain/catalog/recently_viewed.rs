//! Recently Viewed

use std::sync::Arc;

use storefront::products::ProductUuid;

use crate::storage::{KeyValueStore, StorageError, read_json, write_json};

/// Local storage key.
pub const RECENTLY_VIEWED_KEY: &str = "storefront.recently_viewed";

/// Products remembered.
pub const RECENTLY_VIEWED_LIMIT: usize = 12;

/// Product views, most recent first, without duplicates.
#[derive(Clone)]
pub struct RecentlyViewedService {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for RecentlyViewedService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentlyViewedService").finish_non_exhaustive()
    }
}

impl RecentlyViewedService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Viewed products, most recent first.
    pub fn list(&self) -> Result<Vec<ProductUuid>, StorageError> {
        Ok(read_json(self.store.as_ref(), RECENTLY_VIEWED_KEY)?.unwrap_or_default())
    }

    /// Record a view, moving the product to the front.
    pub fn record(&self, product: ProductUuid) -> Result<(), StorageError> {
        let mut viewed = self.list()?;

        viewed.retain(|uuid| *uuid != product);
        viewed.insert(0, product);
        viewed.truncate(RECENTLY_VIEWED_LIMIT);

        write_json(self.store.as_ref(), RECENTLY_VIEWED_KEY, &viewed)
    }

    /// Forget every view.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove_item(RECENTLY_VIEWED_KEY).map(|_existed| ())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::storage::MemoryStorage;

    use super::*;

    #[test]
    fn views_are_deduplicated_newest_first() -> TestResult {
        let recent = RecentlyViewedService::new(Arc::new(MemoryStorage::new()));
        let mug = ProductUuid::new();
        let tee = ProductUuid::new();

        recent.record(mug)?;
        recent.record(tee)?;
        recent.record(mug)?;

        assert_eq!(recent.list()?, vec![mug, tee]);

        recent.clear()?;
        assert!(recent.list()?.is_empty());

        Ok(())
    }

    #[test]
    fn oldest_views_fall_off() -> TestResult {
        let recent = RecentlyViewedService::new(Arc::new(MemoryStorage::new()));
        let products: Vec<ProductUuid> = (0..=RECENTLY_VIEWED_LIMIT).map(|_| ProductUuid::new()).collect();

        for product in &products {
            recent.record(*product)?;
        }

        let viewed = recent.list()?;

        assert_eq!(viewed.len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(viewed.first(), products.last());
        assert!(!viewed.contains(&products[0]));

        Ok(())
    }
}
