//! Terminal cart commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli cart add 3 -q 2
//! shop-cli cart set 3 5
//! shop-cli cart remove 3
//! shop-cli cart show
//! shop-cli cart clear
//! ```
//!
//! The cart is stored under `SHOP_CART_DIR` (default `.shop-cart`). Only `add`
//! talks to the database, to copy the product's current name and price.

use online_shop_core::ProductId;
use online_shop_core::cart::{CartItem, CartSession, CartStorage};
use online_shop_server::db::ProductRepository;

use crate::cart_file::{DEFAULT_CART_DIR, FileCartStorage};

/// Open the cart in `SHOP_CART_DIR`.
#[must_use]
pub fn open() -> CartSession<FileCartStorage> {
    dotenvy::dotenv().ok();
    let dir = std::env::var("SHOP_CART_DIR").unwrap_or_else(|_| DEFAULT_CART_DIR.to_owned());
    CartSession::load(FileCartStorage::new(dir))
}

/// Add `quantity` of a catalog product.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the product does not exist.
pub async fn add(product_id: ProductId, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let product = ProductRepository::new(&pool)
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| format!("No product with id {product_id}"))?;

    if !product.in_stock() {
        tracing::warn!(product_id = %product.id, "{} is out of stock", product.name);
    }

    let mut cart = open();
    cart.add_item(&product, quantity);
    tracing::info!("Added {} × {}", quantity, product.name);
    print_cart(&cart);
    Ok(())
}

/// Set the quantity of a line; zero or less removes it.
pub fn set(product_id: ProductId, quantity: i64) {
    let mut cart = open();
    cart.set_quantity(product_id, quantity);
    print_cart(&cart);
}

/// Remove a line.
pub fn remove(product_id: ProductId) {
    let mut cart = open();
    cart.remove_item(product_id);
    print_cart(&cart);
}

/// Print the cart.
pub fn show() {
    print_cart(&open());
}

/// Empty the cart.
pub fn clear() {
    let mut cart = open();
    cart.clear();
    tracing::info!("Cart cleared");
}

fn render_line(item: &CartItem) -> String {
    format!(
        "#{}  {} × {} = {}  (@ {})",
        item.product_id,
        item.name,
        item.quantity,
        item.line_total(),
        item.unit_price
    )
}

/// Render the cart as printable lines, warning about stock overruns.
#[must_use]
pub fn render<S: CartStorage>(cart: &CartSession<S>) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_owned()];
    }
    let mut lines: Vec<String> = cart.items().iter().map(render_line).collect();
    lines.push(format!("Total: {}", cart.total()));
    lines
}

fn print_cart<S: CartStorage>(cart: &CartSession<S>) {
    for item in cart.items().iter().filter(|item| item.exceeds_stock()) {
        tracing::warn!(
            product_id = %item.product_id,
            "{}: {} in cart, only {} in stock",
            item.name,
            item.quantity,
            item.stock_limit
        );
    }

    #[allow(clippy::print_stdout)]
    for line in render(cart) {
        println!("{line}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use online_shop_core::Price;
    use online_shop_core::cart::MemoryCartStorage;
    use online_shop_core::catalog::Product;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(3),
            name: "Кружка".to_owned(),
            price: Price::from_units(450),
            description: String::new(),
            image: String::new(),
            category: "Посуда".to_owned(),
            count_in_stock: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_empty() {
        let cart = CartSession::load(MemoryCartStorage::new());
        assert_eq!(render(&cart), vec!["Cart is empty"]);
    }

    #[test]
    fn test_render_lines_and_total() {
        let mut cart = CartSession::load(MemoryCartStorage::new());
        cart.add_item(&product(), 2);
        let lines = render(&cart);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Кружка × 2 = 900 ₽"));
        assert_eq!(lines[1], "Total: 900 ₽");
    }
}
