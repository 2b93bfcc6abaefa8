//! Cart store: line items keyed by product, persisted after every change.
//!
//! The total is never stored; [`CartStore::total_amount`] sums the lines on
//! each call. Quantities are always positive: setting a line to zero removes
//! it.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, instrument, warn};

use cue_shop_core::{CartItem, Price, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::notify::Notifier;
use crate::storage::{Storage, keys};

/// Largest quantity a single line can be edited to.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Owner of the shopping cart. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    items: RwLock<Vec<CartItem>>,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &*self.inner.items.read().unwrap_or_else(PoisonError::into_inner))
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the persisted cart. An unreadable cart starts empty.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        let items = match storage.get_json::<Vec<CartItem>>(keys::CART) {
            Ok(items) => items
                .unwrap_or_default()
                .into_iter()
                .filter(|item| item.quantity > 0)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart");
                Vec::new()
            }
        };
        debug!(lines = items.len(), "Cart loaded");

        Self {
            inner: Arc::new(CartInner {
                items: RwLock::new(items),
                storage,
                notifier,
            }),
        }
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_amount(&self) -> Price {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(CartItem::line_total)
            .sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Add a line, or grow the existing line for the same product. The line
    /// never exceeds [`MAX_LINE_QUANTITY`].
    ///
    /// Stock is not checked here; callers validate before adding.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub fn add_to_cart(&self, item: CartItem) {
        if item.quantity == 0 {
            debug!("Ignoring zero-quantity add");
            return;
        }

        let product_id = item.product_id.to_string();
        self.mutate(|items| {
            match items.iter_mut().find(|line| line.product_id == item.product_id) {
                Some(line) => {
                    line.quantity = line
                        .quantity
                        .saturating_add(item.quantity)
                        .min(MAX_LINE_QUANTITY);
                }
                None => items.push(CartItem {
                    quantity: item.quantity.min(MAX_LINE_QUANTITY),
                    ..item
                }),
            }
        });

        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
        self.inner.notifier.success("Đã thêm vào giỏ");
    }

    /// Remove the line for `product_id`; unknown ids leave the cart as is.
    /// The notification is sent either way.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&self, product_id: ProductId) {
        self.mutate(|items| items.retain(|line| line.product_id != product_id));

        let product_id = product_id.to_string();
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.inner.notifier.success("Đã xóa sản phẩm");
    }

    /// Set the quantity of a line. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Rejected`] above [`MAX_LINE_QUANTITY`].
    #[instrument(skip(self))]
    pub fn update_quantity(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            self.remove_from_cart(product_id);
            return Ok(());
        }
        if quantity > MAX_LINE_QUANTITY {
            self.inner.notifier.error("Số lượng quá lớn!");
            return Err(AppError::Rejected("Số lượng quá lớn!".to_string()));
        }

        self.mutate(|items| {
            if let Some(line) = items.iter_mut().find(|line| line.product_id == product_id) {
                line.quantity = quantity;
            }
        });
        Ok(())
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) {
        self.mutate(Vec::clear);
        add_breadcrumb("cart", "Cleared cart", None);
    }

    /// Apply `f` and persist the result under the same lock, so writes reach
    /// storage in mutation order.
    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<CartItem>),
    {
        let mut items = self
            .inner
            .items
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut items);

        if let Err(e) = self.inner.storage.set_json(keys::CART, items.as_slice()) {
            AppError::Storage(e).report();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;

    fn line(id: i64, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Sản phẩm {id}"),
            price: Price::from_dong(price),
            quantity,
            image_url: None,
        }
    }

    fn cart() -> (CartStore, Arc<dyn Storage>, Arc<RecordingNotifier>) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let store = CartStore::load(Arc::clone(&storage), notifier.clone());
        (store, storage, notifier)
    }

    #[test]
    fn test_add_same_product_merges_quantity() {
        let (cart, _, notifier) = cart();
        cart.add_to_cart(line(1, 100, 2));
        cart.add_to_cart(line(1, 100, 3));

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(notifier.messages(), ["Đã thêm vào giỏ", "Đã thêm vào giỏ"]);
    }

    #[test]
    fn test_total_amount() {
        let (cart, _, _) = cart();
        cart.add_to_cart(line(1, 100, 2));
        cart.add_to_cart(line(2, 50, 1));
        assert_eq!(cart.total_amount(), Price::from_dong(250));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_remove_unknown_product_is_noop() {
        let (cart, _, notifier) = cart();
        cart.add_to_cart(line(1, 100, 2));
        let before = cart.items();

        cart.remove_from_cart(ProductId::new(42));

        assert_eq!(cart.items(), before);
        assert_eq!(notifier.messages(), ["Đã thêm vào giỏ", "Đã xóa sản phẩm"]);
    }

    #[test]
    fn test_merged_add_stops_at_999() {
        let (cart, _, _) = cart();
        cart.add_to_cart(line(1, 100, 999));
        cart.add_to_cart(line(1, 100, 999));
        assert_eq!(cart.items()[0].quantity, MAX_LINE_QUANTITY);

        cart.add_to_cart(line(2, 50, 5000));
        assert_eq!(cart.items()[1].quantity, MAX_LINE_QUANTITY);
        assert_eq!(cart.total_amount(), Price::from_dong(999 * 150));
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let (cart, _, _) = cart();
        cart.add_to_cart(line(1, 100, 2));
        cart.add_to_cart(line(2, 50, 1));

        cart.update_quantity(ProductId::new(1), 0).unwrap();

        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id).collect();
        assert_eq!(ids, [ProductId::new(2)]);
    }

    #[test]
    fn test_update_quantity_caps_at_999() {
        let (cart, _, notifier) = cart();
        cart.add_to_cart(line(1, 100, 2));

        assert!(cart.update_quantity(ProductId::new(1), 1000).is_err());
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(
            notifier.messages().last().map(String::as_str),
            Some("Số lượng quá lớn!")
        );

        cart.update_quantity(ProductId::new(1), 999).unwrap();
        assert_eq!(cart.items()[0].quantity, 999);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (cart, storage, notifier) = cart();
        cart.add_to_cart(line(3, 70, 1));
        cart.add_to_cart(line(1, 100, 2));
        cart.update_quantity(ProductId::new(3), 4).unwrap();

        let reloaded = CartStore::load(Arc::clone(&storage), notifier.clone());
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.items()[0].quantity, 4);

        cart.clear_cart();
        let reloaded = CartStore::load(storage, notifier);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_corrupt_cart_starts_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set(keys::CART, "[{\"productId\":").unwrap();
        let cart = CartStore::load(storage, Arc::new(RecordingNotifier::new()));
        assert!(cart.is_empty());
    }
}
