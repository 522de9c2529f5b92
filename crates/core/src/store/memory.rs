//! In-memory [`OrderStore`] for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::{OrderStore, StoreError};
use crate::OrderId;
use crate::access::{Caller, OrderScope};
use crate::order::{Order, OrderDraft};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    orders: BTreeMap<OrderId, Order>,
    fail_next: Option<StoreError>,
}

/// Orders kept in a map, same access rules as the database store.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    inner: Mutex<Inner>,
    create_calls: AtomicUsize,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation fail with `err`.
    pub fn fail_next(&self, err: StoreError) {
        self.lock().fail_next = Some(err);
    }

    /// Number of `create_order` calls, failed ones included.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(
        &self,
        id: OrderId,
        caller: &Caller,
        apply: impl FnOnce(&mut Order),
    ) -> Result<Order, StoreError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        caller.require_admin()?;
        let order = inner.orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        apply(order);
        Ok(order.clone())
    }
}

impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        draft.validate()?;

        inner.next_id += 1;
        let id = OrderId::new(inner.next_id);
        let order = Order::from_draft(id, draft, Utc::now());
        inner.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId, caller: &Caller) -> Result<Order, StoreError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        let order = inner.orders.get(&id).ok_or(StoreError::NotFound)?;
        order.ensure_readable_by(caller)?;
        Ok(order.clone())
    }

    async fn list_orders(
        &self,
        caller: &Caller,
        scope: OrderScope,
    ) -> Result<Vec<Order>, StoreError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        if scope == OrderScope::All {
            caller.require_admin()?;
        }
        Ok(inner
            .orders
            .values()
            .rev()
            .filter(|order| scope == OrderScope::All || order.is_owned_by(caller.user_id))
            .cloned()
            .collect())
    }

    async fn set_order_paid(&self, id: OrderId, caller: &Caller) -> Result<Order, StoreError> {
        self.update(id, caller, |order| {
            order.mark_paid(Utc::now());
        })
    }

    async fn set_order_delivered(
        &self,
        id: OrderId,
        caller: &Caller,
    ) -> Result<Order, StoreError> {
        self.update(id, caller, |order| {
            order.mark_delivered(Utc::now());
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::tests::draft;
    use crate::{Role, UserId};

    const OWNER: Caller = Caller::new(UserId::new(1), Role::User);
    const OTHER: Caller = Caller::new(UserId::new(2), Role::User);
    const ADMIN: Caller = Caller::new(UserId::new(9), Role::Admin);

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryOrderStore::new();
        let created = store.create_order(draft(Some(OWNER.user_id))).await.unwrap();

        let fetched = store.get_order(created.id, &OWNER).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            store.get_order(created.id, &OTHER).await,
            Err(StoreError::Forbidden)
        );
        assert_eq!(
            store.get_order(OrderId::new(404), &ADMIN).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let store = MemoryOrderStore::new();
        let mut bad = draft(None);
        bad.items.clear();
        assert!(matches!(
            store.create_order(bad).await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_scopes() {
        let store = MemoryOrderStore::new();
        store.create_order(draft(Some(OWNER.user_id))).await.unwrap();
        store.create_order(draft(Some(OTHER.user_id))).await.unwrap();
        store.create_order(draft(None)).await.unwrap();

        assert_eq!(store.list_orders(&OWNER, OrderScope::Mine).await.unwrap().len(), 1);
        assert_eq!(store.list_orders(&ADMIN, OrderScope::All).await.unwrap().len(), 3);
        assert_eq!(
            store.list_orders(&OWNER, OrderScope::All).await,
            Err(StoreError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_status_changes_need_admin() {
        let store = MemoryOrderStore::new();
        let order = store.create_order(draft(Some(OWNER.user_id))).await.unwrap();

        assert_eq!(
            store.set_order_paid(order.id, &OWNER).await,
            Err(StoreError::Forbidden)
        );

        let paid = store.set_order_paid(order.id, &ADMIN).await.unwrap();
        assert!(paid.is_paid);
        let again = store.set_order_paid(order.id, &ADMIN).await.unwrap();
        assert_eq!(again.paid_at, paid.paid_at);

        let delivered = store.set_order_delivered(order.id, &ADMIN).await.unwrap();
        assert!(delivered.is_delivered);
        assert!(delivered.is_paid);

        let missing = OrderId::new(order.id.as_i32() + 100);
        assert_eq!(
            store.set_order_paid(missing, &ADMIN).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(
            store.set_order_delivered(missing, &ADMIN).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = MemoryOrderStore::new();
        store.fail_next(StoreError::Transient("db down".to_owned()));
        assert!(store.create_order(draft(None)).await.is_err());
        assert!(store.create_order(draft(None)).await.is_ok());
        assert_eq!(store.create_calls(), 2);
    }
}
