//! The order persistence boundary.
//!
//! Order submission and the status machine reach storage only through
//! [`OrderStore`]. The server implements it over `PostgreSQL`; tests use
//! [`MemoryOrderStore`].
//!
//! Implementations enforce the access rules:
//!
//! | Operation | Allowed for |
//! |-----------|-------------|
//! | `create_order` | anyone (the draft names the owner) |
//! | `get_order` | owner, admin |
//! | `list_orders(All)` | admin |
//! | `list_orders(Mine)` | any caller, own orders only |
//! | `set_order_paid` / `set_order_delivered` | admin |

#[cfg(any(test, feature = "testing"))]
mod memory;

#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryOrderStore;

use std::future::Future;

use thiserror::Error;

use crate::access::{AccessError, Caller, OrderScope};
use crate::order::{DraftError, Order, OrderDraft};
use crate::OrderId;

/// Failures reported by an [`OrderStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The draft was rejected.
    #[error("invalid order: {0}")]
    Validation(String),

    /// Privilege or ownership check failed.
    #[error("access denied")]
    Forbidden,

    /// No order with that id.
    #[error("order not found")]
    NotFound,

    /// The store could not be reached or failed mid-operation. Safe to retry
    /// by hand; nothing retries automatically.
    #[error("store unavailable: {0}")]
    Transient(String),
}

impl From<AccessError> for StoreError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden => Self::Forbidden,
        }
    }
}

impl From<DraftError> for StoreError {
    fn from(err: DraftError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Persistent order storage with access control.
pub trait OrderStore: Send + Sync {
    /// Persist a new order from `draft`.
    fn create_order(
        &self,
        draft: OrderDraft,
    ) -> impl Future<Output = Result<Order, StoreError>> + Send;

    /// Fetch one order the caller may read.
    fn get_order(
        &self,
        id: OrderId,
        caller: &Caller,
    ) -> impl Future<Output = Result<Order, StoreError>> + Send;

    /// List orders, newest first.
    fn list_orders(
        &self,
        caller: &Caller,
        scope: OrderScope,
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Mark an order paid (admin only). Already-paid orders are returned unchanged.
    fn set_order_paid(
        &self,
        id: OrderId,
        caller: &Caller,
    ) -> impl Future<Output = Result<Order, StoreError>> + Send;

    /// Mark an order delivered (admin only). Already-delivered orders are
    /// returned unchanged.
    fn set_order_delivered(
        &self,
        id: OrderId,
        caller: &Caller,
    ) -> impl Future<Output = Result<Order, StoreError>> + Send;
}
