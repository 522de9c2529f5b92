//! Order back-office commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli orders list [--user-email anna@example.ru]
//! shop-cli orders show 12
//! shop-cli orders pay 12
//! shop-cli orders deliver 12
//! ```
//!
//! The operator acts with admin capability.

use online_shop_core::access::{Caller, OrderScope};
use online_shop_core::order::Order;
use online_shop_core::store::OrderStore;
use online_shop_core::{Email, OrderId};
use online_shop_server::db::UserRepository;
use online_shop_server::services::PgOrderStore;

use super::OPERATOR;

/// One-line summary of an order.
#[must_use]
pub fn summary(order: &Order) -> String {
    let owner = order
        .user_id
        .map_or_else(|| "guest".to_owned(), |id| format!("user {id}"));
    format!(
        "#{}  {}  {}  {}  {} items  {}",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M"),
        owner,
        order.status(),
        order.items.len(),
        order.total_price
    )
}

/// Full description of an order.
#[must_use]
pub fn details(order: &Order) -> Vec<String> {
    let mut lines = vec![
        summary(order),
        format!("  To: {}, {}", order.contact.full_name, order.contact.phone),
        format!(
            "  Address: {}, {}, {}, {}",
            order.shipping_address.address,
            order.shipping_address.city,
            order.shipping_address.postal_code,
            order.shipping_address.country
        ),
        format!("  Payment: {}", order.payment_method),
    ];
    if let Some(paid_at) = order.paid_at {
        lines.push(format!("  Paid at: {}", paid_at.format("%Y-%m-%d %H:%M")));
    }
    if let Some(delivered_at) = order.delivered_at {
        lines.push(format!(
            "  Delivered at: {}",
            delivered_at.format("%Y-%m-%d %H:%M")
        ));
    }
    lines.extend(order.items.iter().map(|item| {
        format!(
            "  - #{} {} × {} @ {}",
            item.product_id, item.name, item.quantity, item.price
        )
    }));
    lines
}

#[allow(clippy::print_stdout)]
fn print(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}

async fn store() -> Result<PgOrderStore, super::ConnectError> {
    Ok(PgOrderStore::new(super::connect().await?))
}

async fn caller_for(
    pool: &sqlx::PgPool,
    email: &str,
) -> Result<Caller, Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let user = UserRepository::new(pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| format!("No user with email: {email}"))?;
    Ok(Caller::new(user.id, user.role))
}

/// List all orders, or one customer's.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the email is unknown.
pub async fn list(user_email: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let store = PgOrderStore::new(pool.clone());

    let orders = match user_email {
        Some(email) => {
            let customer = caller_for(&pool, &email).await?;
            store.list_orders(&customer, OrderScope::Mine).await?
        }
        None => store.list_orders(&OPERATOR, OrderScope::All).await?,
    };

    if orders.is_empty() {
        tracing::info!("No orders");
    }
    print(orders.iter().map(summary));
    Ok(())
}

/// Show one order.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub async fn show(id: OrderId) -> Result<(), Box<dyn std::error::Error>> {
    let order = store().await?.get_order(id, &OPERATOR).await?;
    print(details(&order));
    Ok(())
}

/// Mark an order paid.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub async fn pay(id: OrderId) -> Result<(), Box<dyn std::error::Error>> {
    let order = store().await?.set_order_paid(id, &OPERATOR).await?;
    print([summary(&order)]);
    Ok(())
}

/// Mark an order delivered.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub async fn deliver(id: OrderId) -> Result<(), Box<dyn std::error::Error>> {
    let order = store().await?.set_order_delivered(id, &OPERATOR).await?;
    print([summary(&order)]);
    Ok(())
}
