//! Catalog repository.

use sqlx::PgPool;

use online_shop_core::ProductId;
use online_shop_core::catalog::{Product, ProductInput};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str =
    "id, name, price, description, image, category, count_in_stock, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product
             WHERE $1::TEXT IS NULL OR category = $1
             ORDER BY id"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO shop.product (name, price, description, image, category, count_in_stock)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.category)
        .bind(input.count_in_stock)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE shop.product
             SET name = $2, price = $3, description = $4, image = $5,
                 category = $6, count_in_stock = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.category)
        .bind(input.count_in_stock)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Existing orders keep their snapshot of it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
