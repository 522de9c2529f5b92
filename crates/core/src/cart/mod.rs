//! Client-local shopping cart.
//!
//! A [`Cart`] is what a visitor intends to buy before checkout. It lives on the
//! client (for `shop-cli`, a JSON file) and never touches the server until the
//! order is submitted. [`CartSession`] ties a cart to its storage slot so that
//! every mutation is persisted.
//!
//! The cart does not enforce stock limits. Callers that offer quantity
//! controls check [`CartItem::exceeds_stock`] themselves.

mod session;
mod storage;

pub use session::{CART_STORAGE_KEY, CartSession};
pub use storage::{CartStorage, CartStorageError, MemoryCartStorage};

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::{Price, ProductId};

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    /// Units in stock when the product was added.
    pub stock_limit: u32,
    pub image: String,
    pub description: String,
}

impl CartItem {
    /// Copy the product's current fields into a new line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            stock_limit: u32::try_from(product.count_in_stock).unwrap_or(0),
            image: product.image.clone(),
            description: product.description.clone(),
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }

    /// Whether the quantity is above the stock seen when the line was added.
    #[must_use]
    pub const fn exceeds_stock(&self) -> bool {
        self.quantity > self.stock_limit
    }
}

/// Ordered collection of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product has its quantity increased; the
    /// price and other fields recorded when it was first added are kept.
    /// Otherwise a new line is appended. A zero quantity is a no-op.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|item| item.product_id == product.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(CartItem::from_product(product, quantity)),
        }
    }

    /// Set the quantity of a line.
    ///
    /// `quantity <= 0` removes the line. Values above the stock limit are
    /// accepted as-is. Unknown products are ignored.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
        } else if let Some(item) = self.line_mut(product_id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove the line for `product_id`; no-op when absent.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `Σ(unit_price × quantity)` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units (cart badge).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;

    pub(crate) fn product(id: i32, price: i64, stock: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Товар {id}"),
            price: Price::from_units(price),
            description: "описание".to_owned(),
            image: format!("/images/{id}.jpg"),
            category: "Разное".to_owned(),
            count_in_stock: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn recomputed(cart: &Cart) -> Price {
        cart.items()
            .iter()
            .map(|item| item.unit_price * item.quantity)
            .sum()
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let mut cart = Cart::new();
        let p = product(1, 100, 10);
        cart.add_item(&p, 2);
        cart.add_item(&p, 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(p.id).map(|item| item.quantity), Some(5));
    }

    #[test]
    fn test_add_keeps_first_snapshot() {
        let mut cart = Cart::new();
        let mut p = product(1, 100, 10);
        cart.add_item(&p, 1);
        p.price = Price::from_units(999);
        cart.add_item(&p, 1);

        assert_eq!(cart.total(), Price::from_units(200));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100, 10), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100, 10), 2);
        cart.add_item(&product(2, 50, 10), 1);

        cart.set_quantity(ProductId::new(1), 0);
        assert!(cart.get(ProductId::new(1)).is_none());

        cart.set_quantity(ProductId::new(2), -4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_above_stock_is_accepted() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100, 3), 1);
        cart.set_quantity(ProductId::new(1), 7);

        let item = cart.get(ProductId::new(1)).cloned();
        assert_eq!(item.as_ref().map(|i| i.quantity), Some(7));
        assert_eq!(item.map(|i| i.exceeds_stock()), Some(true));
    }

    #[test]
    fn test_set_quantity_unknown_product_is_ignored() {
        let mut cart = Cart::new();
        cart.set_quantity(ProductId::new(9), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100, 10), 1);
        cart.remove_item(ProductId::new(2));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let mut cart = Cart::new();
        let a = product(1, 100, 10);
        let b = product(2, 35, 10);
        let c = product(3, 1999, 1);

        cart.add_item(&a, 2);
        assert_eq!(cart.total(), recomputed(&cart));
        cart.add_item(&b, 3);
        assert_eq!(cart.total(), recomputed(&cart));
        cart.add_item(&c, 1);
        cart.set_quantity(b.id, 1);
        assert_eq!(cart.total(), recomputed(&cart));
        cart.remove_item(a.id);
        assert_eq!(cart.total(), Price::from_units(35 + 1999));
        cart.set_quantity(c.id, 0);
        assert_eq!(cart.total(), Price::from_units(35));
        cart.clear();
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_item_count() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100, 10), 2);
        cart.add_item(&product(2, 100, 10), 3);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        cart.add_item(&product(3, 1, 1), 1);
        cart.add_item(&product(1, 1, 1), 1);
        cart.add_item(&product(2, 1, 1), 1);
        cart.add_item(&product(3, 1, 1), 1);

        let ids: Vec<i32> = cart.items().iter().map(|i| i.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
