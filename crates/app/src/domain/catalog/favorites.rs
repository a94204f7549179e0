//! Favorites

use std::sync::Arc;

use storefront::products::ProductUuid;
use tracing::debug;

use crate::storage::{KeyValueStore, StorageError, read_json, write_json};

/// Local storage key.
pub const FAVORITES_KEY: &str = "storefront.favorites";

/// Products the shopper has marked as favorites, kept in local storage.
#[derive(Clone)]
pub struct FavoritesService {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for FavoritesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesService").finish_non_exhaustive()
    }
}

impl FavoritesService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Favorites in the order they were added.
    pub fn list(&self) -> Result<Vec<ProductUuid>, StorageError> {
        Ok(read_json(self.store.as_ref(), FAVORITES_KEY)?.unwrap_or_default())
    }

    /// Whether a product is a favorite.
    pub fn contains(&self, product: ProductUuid) -> Result<bool, StorageError> {
        Ok(self.list()?.contains(&product))
    }

    /// Add or remove a favorite. Returns `true` if the product is now a favorite.
    pub fn toggle(&self, product: ProductUuid) -> Result<bool, StorageError> {
        let mut favorites = self.list()?;

        let added = if let Some(index) = favorites.iter().position(|uuid| *uuid == product) {
            favorites.remove(index);
            false
        } else {
            favorites.push(product);
            true
        };

        write_json(self.store.as_ref(), FAVORITES_KEY, &favorites)?;

        debug!(%product, added, "toggled favorite");

        Ok(added)
    }
}
