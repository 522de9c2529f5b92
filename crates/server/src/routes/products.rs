//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use online_shop_core::ProductId;
use online_shop_core::catalog::{Product, ProductInput};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

impl ProductQuery {
    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(query.category())
        .await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// POST /api/products
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = input.validate()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
#[instrument(skip(state, admin, id, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    let input = input.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
#[instrument(skip(state, admin, id), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
