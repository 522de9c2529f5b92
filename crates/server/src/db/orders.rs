//! Order repository.
//!
//! An order is one `shop.order` row plus its `shop.order_item` lines, written
//! in a single transaction. After creation only the paid and delivered flags
//! change; each flag's timestamp is set once and then kept.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use online_shop_core::order::{
    ContactInfo, Order, OrderDraft, OrderItem, PaymentMethod, ShippingAddress,
};
use online_shop_core::{OrderId, Price, ProductId, UserId};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, contact_name, contact_phone, shipping_address, \
     shipping_city, shipping_postal_code, shipping_country, payment_method, total_price, \
     is_paid, paid_at, is_delivered, delivered_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    contact_name: String,
    contact_phone: String,
    shipping_address: String,
    shipping_city: String,
    shipping_postal_code: String,
    shipping_country: String,
    payment_method: String,
    total_price: Price,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    quantity: i32,
    price: Price,
    image: String,
}

impl OrderItemRow {
    fn into_item(self) -> Result<OrderItem, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {} has quantity {} for product {}",
                self.order_id, self.quantity, self.product_id
            ))
        })?;
        Ok(OrderItem {
            product_id: self.product_id,
            name: self.name,
            quantity,
            price: self.price,
            image: self.image,
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            items,
            user_id: self.user_id,
            contact: ContactInfo {
                full_name: self.contact_name,
                phone: self.contact_phone,
            },
            shipping_address: ShippingAddress {
                address: self.shipping_address,
                city: self.shipping_city,
                postal_code: self.shipping_postal_code,
                country: self.shipping_country,
            },
            payment_method: PaymentMethod::new(self.payment_method),
            total_price: self.total_price,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines.
    ///
    /// The draft must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO shop.order (
                 user_id, contact_name, contact_phone, shipping_address, shipping_city,
                 shipping_postal_code, shipping_country, payment_method, total_price
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(draft.user_id)
        .bind(&draft.contact.full_name)
        .bind(&draft.contact.phone)
        .bind(&draft.shipping_address.address)
        .bind(&draft.shipping_address.city)
        .bind(&draft.shipping_address.postal_code)
        .bind(&draft.shipping_address.country)
        .bind(draft.payment_method.as_str())
        .bind(draft.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in draft.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::Conflict("too many items in one order".to_owned())
            })?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::Conflict(format!("quantity too large for {}", item.product_id))
            })?;
            sqlx::query(
                "INSERT INTO shop.order_item
                     (order_id, position, product_id, name, quantity, price, image)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(row.id)
            .bind(position)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(quantity)
            .bind(item.price)
            .bind(&item.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into_order(draft.items.clone()))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List orders newest first, optionally only those owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: Option<UserId>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order
             WHERE $1::INTEGER IS NULL OR user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Set the paid flag, keeping the first `paid_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_paid(&self, id: OrderId) -> Result<Order, RepositoryError> {
        self.set_flag(id, "is_paid", "paid_at").await
    }

    /// Set the delivered flag, keeping the first `delivered_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, RepositoryError> {
        self.set_flag(id, "is_delivered", "delivered_at").await
    }

    async fn set_flag(
        &self,
        id: OrderId,
        flag: &'static str,
        stamp: &'static str,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE shop.order
             SET {flag} = TRUE,
                 {stamp} = COALESCE({stamp}, NOW()),
                 updated_at = CASE WHEN {flag} THEN updated_at ELSE NOW() END
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        self.attach_items(vec![row])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    /// Load the lines for `rows` in one query and build the orders.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, name, quantity, price, image
             FROM shop.order_item
             WHERE order_id = ANY($1)
             ORDER BY order_id, position",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item_row in item_rows {
            let order_id = item_row.order_id;
            items.entry(order_id).or_default().push(item_row.into_item()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect())
    }
}
