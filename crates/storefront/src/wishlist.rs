//! Wishlist: product ids persisted under [`keys::WISHLIST`].

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{instrument, warn};

use cue_shop_core::{Product, ProductId};

use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::storage::{Storage, keys};

/// Saved products. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<WishlistInner>,
}

struct WishlistInner {
    ids: RwLock<Vec<ProductId>>,
    storage: Arc<dyn Storage>,
}

impl WishlistStore {
    /// Load the persisted wishlist. An unreadable list starts empty.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let ids = storage
            .get_json::<Vec<ProductId>>(keys::WISHLIST)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable wishlist");
                None
            })
            .unwrap_or_default();

        Self {
            inner: Arc::new(WishlistInner {
                ids: RwLock::new(ids),
                storage,
            }),
        }
    }

    /// Saved ids in the order they were added.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.inner
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.inner
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Save a product; returns `false` if it was already saved.
    ///
    /// # Errors
    ///
    /// Returns error if the list cannot be persisted.
    pub fn add(&self, id: ProductId) -> Result<bool> {
        self.mutate(|ids| {
            if ids.contains(&id) {
                false
            } else {
                ids.push(id);
                true
            }
        })
    }

    /// Forget a product; returns `false` if it was not saved.
    ///
    /// # Errors
    ///
    /// Returns error if the list cannot be persisted.
    pub fn remove(&self, id: ProductId) -> Result<bool> {
        self.mutate(|ids| {
            let before = ids.len();
            ids.retain(|saved| *saved != id);
            ids.len() != before
        })
    }

    /// Saved products that still exist, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns error if the catalog cannot be fetched.
    #[instrument(skip_all)]
    pub async fn products(&self, api: &ApiClient) -> Result<Vec<Product>> {
        let ids = self.ids();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = api.products().await?;
        Ok(catalog
            .iter()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect())
    }

    fn mutate<F>(&self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<ProductId>) -> bool,
    {
        let mut ids = self
            .inner
            .ids
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !f(&mut ids) {
            return Ok(false);
        }
        self.inner
            .storage
            .set_json(keys::WISHLIST, ids.as_slice())
            .map_err(AppError::Storage)?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_add_remove_and_persist() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let wishlist = WishlistStore::load(Arc::clone(&storage));

        assert!(wishlist.add(ProductId::new(5)).unwrap());
        assert!(wishlist.add(ProductId::new(2)).unwrap());
        assert!(!wishlist.add(ProductId::new(5)).unwrap());

        let reloaded = WishlistStore::load(Arc::clone(&storage));
        assert_eq!(reloaded.ids(), [ProductId::new(5), ProductId::new(2)]);

        assert!(wishlist.remove(ProductId::new(5)).unwrap());
        assert!(!wishlist.remove(ProductId::new(5)).unwrap());
        assert!(!WishlistStore::load(storage).contains(ProductId::new(5)));
    }

    #[tokio::test]
    async fn test_empty_wishlist_skips_catalog_fetch() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let wishlist = WishlistStore::load(storage);
        // Unroutable base URL: any request would fail
        let api = ApiClient::with_base_url(url::Url::parse("http://127.0.0.1:9/api").unwrap());
        assert!(wishlist.products(&api).await.unwrap().is_empty());
    }
}
