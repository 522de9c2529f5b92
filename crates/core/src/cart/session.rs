//! A cart bound to its storage slot.

use crate::catalog::Product;
use crate::{Price, ProductId};

use super::{Cart, CartItem, CartStorage};

/// Storage key holding the serialized cart lines.
pub const CART_STORAGE_KEY: &str = "cartItems";

/// The browsing session's cart together with the slot it is persisted to.
///
/// Load once with [`CartSession::load`]; every mutation afterwards writes the
/// serialized lines back. Persistence problems never fail a cart operation:
/// they are logged and the in-memory cart stays authoritative for the session.
#[derive(Debug)]
pub struct CartSession<S> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartSession<S> {
    /// Restore the cart from `storage`.
    ///
    /// A missing slot, a read error or unparseable contents all yield an
    /// empty cart.
    pub fn load(storage: S) -> Self {
        let cart = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored cart is corrupt, starting empty");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored cart, starting empty");
                Cart::new()
            }
        };

        Self { cart, storage }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// See [`Cart::add_item`].
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        self.cart.add_item(product, quantity);
        self.persist();
    }

    /// See [`Cart::set_quantity`].
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        self.cart.set_quantity(product_id, quantity);
        self.persist();
    }

    /// See [`Cart::remove_item`].
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.cart.remove_item(product_id);
        self.persist();
    }

    /// Empty the cart, e.g. after a successful checkout.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    /// Give back the storage (tests, shutdown).
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.cart) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.save(CART_STORAGE_KEY, &serialized) {
            tracing::warn!(error = %e, "could not save cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::cart::{CartStorageError, MemoryCartStorage};

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, CartStorageError> {
            Err(CartStorageError::Unavailable("disk gone".to_owned()))
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), CartStorageError> {
            Err(CartStorageError::Unavailable("disk gone".to_owned()))
        }
    }

    #[test]
    fn test_mutations_are_persisted_and_reloaded() {
        let mut session = CartSession::load(MemoryCartStorage::new());
        session.add_item(&product(1, 100, 5), 2);
        session.add_item(&product(2, 40, 5), 1);
        session.set_quantity(ProductId::new(2), 3);

        let storage = session.into_storage();
        assert!(storage.get(CART_STORAGE_KEY).is_some());

        let reloaded = CartSession::load(storage);
        assert_eq!(reloaded.items().len(), 2);
        assert_eq!(reloaded.total(), Price::from_units(320));
    }

    #[test]
    fn test_missing_slot_is_empty() {
        let session = CartSession::load(MemoryCartStorage::new());
        assert!(session.is_empty());
    }

    #[test]
    fn test_corrupt_slot_degrades_to_empty() {
        let storage = MemoryCartStorage::with_value(CART_STORAGE_KEY, "{not json");
        let session = CartSession::load(storage);
        assert!(session.is_empty());
        assert_eq!(session.total(), Price::ZERO);
    }

    #[test]
    fn test_unreadable_storage_still_works_in_memory() {
        let mut session = CartSession::load(BrokenStorage);
        session.add_item(&product(1, 10, 5), 1);
        assert_eq!(session.total(), Price::from_units(10));
    }

    #[test]
    fn test_clear_persists_empty_list() {
        let mut session = CartSession::load(MemoryCartStorage::new());
        session.add_item(&product(1, 100, 5), 1);
        session.clear();

        let storage = session.into_storage();
        assert_eq!(storage.get(CART_STORAGE_KEY), Some("[]"));
    }
}
