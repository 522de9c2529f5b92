//! Order route handlers.
//!
//! Access rules live in the order store; handlers only resolve the caller.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use online_shop_core::OrderId;
use online_shop_core::Price;
use online_shop_core::access::OrderScope;
use online_shop_core::order::{
    ContactInfo, Order, OrderDraft, OrderItem, OrderStatus, PaymentMethod, ShippingAddress,
};
use online_shop_core::store::OrderStore;

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Order submission body. The owner comes from the session, never the body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub contact: ContactInfo,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub total_price: Price,
}

/// An order plus its derived status.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status: OrderStatus,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let status = order.status();
        Self { order, status }
    }
}

fn views(orders: Vec<Order>) -> Json<Vec<OrderView>> {
    Json(orders.into_iter().map(OrderView::from).collect())
}

/// POST /api/orders
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let draft = OrderDraft {
        items: body.items,
        user_id: user.map(|u| u.id),
        contact: body.contact,
        shipping_address: body.shipping_address,
        payment_method: body.payment_method,
        total_price: body.total_price,
    };
    let order = state.orders().create_order(draft).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state
        .orders()
        .list_orders(&user.caller(), OrderScope::All)
        .await?;
    Ok(views(orders))
}

/// GET /api/orders/mine
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state
        .orders()
        .list_orders(&user.caller(), OrderScope::Mine)
        .await?;
    Ok(views(orders))
}

/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderView>> {
    let Path(id) = id?;
    let order = state.orders().get_order(id, &user.caller()).await?;
    Ok(Json(order.into()))
}

/// PUT /api/orders/{id}/pay
#[instrument(skip(state, user, id), fields(user_id = %user.id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderView>> {
    let Path(id) = id?;
    let order = state.orders().set_order_paid(id, &user.caller()).await?;
    Ok(Json(order.into()))
}

/// PUT /api/orders/{id}/deliver
#[instrument(skip(state, user, id), fields(user_id = %user.id))]
pub async fn deliver(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderView>> {
    let Path(id) = id?;
    let order = state
        .orders()
        .set_order_delivered(id, &user.caller())
        .await?;
    Ok(Json(order.into()))
}
