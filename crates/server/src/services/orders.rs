//! `PostgreSQL` implementation of [`OrderStore`].

use sqlx::PgPool;

use online_shop_core::OrderId;
use online_shop_core::access::{Caller, OrderScope};
use online_shop_core::order::{Order, OrderDraft};
use online_shop_core::store::{OrderStore, StoreError};

use crate::db::{OrderRepository, RepositoryError};

/// Order store backed by the shop database.
///
/// Cheap to clone; holds only the pool handle.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(&self.pool)
    }
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(message) => Self::Validation(message),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "order store query failed");
                Self::Transient(e.to_string())
            }
            RepositoryError::DataCorruption(message) => {
                tracing::error!(%message, "corrupt order data");
                Self::Transient(message)
            }
        }
    }
}

impl OrderStore for PgOrderStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, StoreError> {
        draft.validate()?;
        let order = self.orders().create(&draft).await?;
        tracing::info!(order_id = %order.id, user_id = ?order.user_id, "order created");
        Ok(order)
    }

    async fn get_order(&self, id: OrderId, caller: &Caller) -> Result<Order, StoreError> {
        let order = self
            .orders()
            .get_by_id(id)
            .await?
            .ok_or(StoreError::NotFound)?;
        order.ensure_readable_by(caller)?;
        Ok(order)
    }

    async fn list_orders(
        &self,
        caller: &Caller,
        scope: OrderScope,
    ) -> Result<Vec<Order>, StoreError> {
        let owner = match scope {
            OrderScope::All => {
                caller.require_admin()?;
                None
            }
            OrderScope::Mine => Some(caller.user_id),
        };
        Ok(self.orders().list(owner).await?)
    }

    async fn set_order_paid(&self, id: OrderId, caller: &Caller) -> Result<Order, StoreError> {
        caller.require_admin()?;
        let order = self.orders().mark_paid(id).await?;
        tracing::info!(order_id = %id, paid_at = ?order.paid_at, "order marked paid");
        Ok(order)
    }

    async fn set_order_delivered(
        &self,
        id: OrderId,
        caller: &Caller,
    ) -> Result<Order, StoreError> {
        caller.require_admin()?;
        let order = self.orders().mark_delivered(id).await?;
        tracing::info!(
            order_id = %id,
            delivered_at = ?order.delivered_at,
            "order marked delivered"
        );
        Ok(order)
    }
}
