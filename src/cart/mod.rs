//! Client-resident cart aggregation.
//!
//! The cart owns the list of selected items, merges duplicate additions by
//! product identifier, recalculates totals and counts, and re-serializes
//! itself through a [`CartStorage`] snapshot after every mutation, so a
//! crash loses at most the in-flight operation. Consumers observe changes
//! through a watch channel instead of polling.

mod storage;

pub use storage::{CartStorage, FileCartStorage, CART_STORAGE_KEY};

use crate::services::catalog::ProductRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

/// One cart line. Display fields are denormalized from the product at
/// add-time; later catalog edits do not touch an in-flight cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Totals broadcast to subscribers on every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Sum of price × quantity over all items.
    pub total: Decimal,
    /// Sum of quantities (not the number of distinct items).
    pub count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("cart snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cart snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// The cart store: an explicit state object injected into consumers rather
/// than accessed as an ambient singleton.
pub struct CartStore {
    items: Vec<CartItem>,
    storage: Box<dyn CartStorage>,
    changes: watch::Sender<CartSummary>,
}

impl CartStore {
    /// Opens the cart, restoring a previously persisted snapshot when one
    /// exists and is well-formed. A missing, corrupt, or unreadable snapshot
    /// yields an empty cart, never an error.
    pub fn open(storage: Box<dyn CartStorage>) -> Self {
        let items = match storage.load() {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to restore cart snapshot; starting empty");
                Vec::new()
            }
        };

        let (changes, _) = watch::channel(summarize(&items));
        Self {
            items,
            storage,
            changes,
        }
    }

    /// Adds `quantity` of `product`, merging with any existing line for the
    /// same product identifier. A zero quantity is a caller error.
    pub fn add(&mut self, product: &ProductRecord, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            existing.quantity += quantity;
        } else {
            self.items.push(CartItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                image_url: product.image_url.clone(),
                price: product.price,
                quantity,
            });
        }

        self.persist_and_notify()
    }

    /// Removes the line for `product_id`; a no-op when absent.
    pub fn remove(&mut self, product_id: &str) -> Result<(), CartError> {
        self.items.retain(|item| item.product_id != product_id);
        self.persist_and_notify()
    }

    /// Replaces the quantity for `product_id`. Zero removes the line; items
    /// are never retained at quantity zero.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product_id);
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            item.quantity = quantity;
        }

        self.persist_and_notify()
    }

    /// Empties the cart. Called once, after a successful order submission.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist_and_notify()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price × quantity over all items; zero for an empty cart.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities across items (distinct from the item count).
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn summary(&self) -> CartSummary {
        summarize(&self.items)
    }

    /// Subscribes to cart changes. The receiver always holds the latest
    /// summary.
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.changes.subscribe()
    }

    fn persist_and_notify(&self) -> Result<(), CartError> {
        self.storage.save(&self.items)?;
        self.changes.send_replace(self.summary());
        Ok(())
    }
}

fn summarize(items: &[CartItem]) -> CartSummary {
    CartSummary {
        total: items.iter().map(CartItem::line_total).sum(),
        count: items.iter().map(|item| item.quantity).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Category;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// In-memory snapshot storage for unit tests.
    struct MemoryCartStorage {
        snapshot: Mutex<Option<Vec<CartItem>>>,
    }

    impl MemoryCartStorage {
        fn empty() -> Self {
            Self {
                snapshot: Mutex::new(None),
            }
        }
    }

    impl CartStorage for MemoryCartStorage {
        fn load(&self) -> Result<Option<Vec<CartItem>>, CartError> {
            Ok(self.snapshot.lock().unwrap().clone())
        }

        fn save(&self, items: &[CartItem]) -> Result<(), CartError> {
            *self.snapshot.lock().unwrap() = Some(items.to_vec());
            Ok(())
        }
    }

    fn product(id: &str, price: Decimal) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: "A bouquet".to_string(),
            price,
            category: Category::Mixed,
            image_url: format!("/images/{}.png", id),
            in_stock: true,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn empty_cart() -> CartStore {
        CartStore::open(Box::new(MemoryCartStorage::empty()))
    }

    #[test]
    fn add_merges_by_product_identity() {
        let mut cart = empty_cart();
        let rose = product("1", dec!(10));

        cart.add(&rose, 1).unwrap();
        cart.add(&rose, 2).unwrap();
        cart.add(&rose, 1).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 4);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let mut cart = empty_cart();
        let err = cart.add(&product("1", dec!(10)), 0).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_and_counts() {
        let mut cart = empty_cart();
        cart.add(&product("1", dec!(10)), 2).unwrap();
        cart.add(&product("2", dec!(5)), 1).unwrap();

        assert_eq!(cart.total(), dec!(25));
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn empty_cart_totals_zero() {
        let cart = empty_cart();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn set_quantity_zero_equals_remove() {
        let mut with_set = empty_cart();
        with_set.add(&product("1", dec!(10)), 2).unwrap();
        with_set.add(&product("2", dec!(5)), 1).unwrap();
        with_set.set_quantity("1", 0).unwrap();

        let mut with_remove = empty_cart();
        with_remove.add(&product("1", dec!(10)), 2).unwrap();
        with_remove.add(&product("2", dec!(5)), 1).unwrap();
        with_remove.remove("1").unwrap();

        assert_eq!(with_set.items(), with_remove.items());
    }

    #[test]
    fn set_quantity_replaces_rather_than_increments() {
        let mut cart = empty_cart();
        cart.add(&product("1", dec!(10)), 2).unwrap();
        cart.set_quantity("1", 5).unwrap();
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn remove_missing_item_is_a_noop() {
        let mut cart = empty_cart();
        cart.add(&product("1", dec!(10)), 1).unwrap();
        cart.remove("nope").unwrap();
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = empty_cart();
        cart.add(&product("1", dec!(10)), 3).unwrap();
        cart.clear().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn subscription_observes_changes() {
        let mut cart = empty_cart();
        let rx = cart.subscribe();

        cart.add(&product("1", dec!(10)), 2).unwrap();
        assert_eq!(
            *rx.borrow(),
            CartSummary {
                total: dec!(20),
                count: 2
            }
        );

        cart.clear().unwrap();
        assert_eq!(*rx.borrow(), CartSummary::default());
    }

    #[test]
    fn snapshot_round_trip_through_file_storage() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut cart = CartStore::open(Box::new(FileCartStorage::new(dir.path())));
            cart.add(&product("1", dec!(10)), 2).unwrap();
            cart.add(&product("2", dec!(5)), 1).unwrap();
        }

        let restored = CartStore::open(Box::new(FileCartStorage::new(dir.path())));
        assert_eq!(restored.items().len(), 2);
        assert_eq!(restored.total(), dec!(25));
        assert_eq!(restored.count(), 3);
    }

    #[test]
    fn corrupt_snapshot_yields_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCartStorage::new(dir.path());
        std::fs::write(storage.path(), "{not json").unwrap();

        let cart = CartStore::open(Box::new(storage));
        assert!(cart.is_empty());
    }

    #[test]
    fn missing_snapshot_yields_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let cart = CartStore::open(Box::new(FileCartStorage::new(dir.path())));
        assert!(cart.is_empty());
    }
}
