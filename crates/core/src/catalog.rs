//! Catalog products.
//!
//! The shop keeps one record per product; there are no variants. Line items in
//! carts and orders copy the fields they need from here at the moment they are
//! created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Image reference (URL or path), opaque to the shop.
    pub image: String,
    pub category: String,
    pub count_in_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub count_in_stock: i32,
}

/// Reasons a [`ProductInput`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductInputError {
    #[error("product name is required")]
    MissingName,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("price must have at most two decimal places and ten whole digits")]
    UnstorablePrice,
    #[error("stock count cannot be negative")]
    NegativeStock,
}

impl ProductInput {
    /// Check the input and return it with the name trimmed.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(mut self) -> Result<Self, ProductInputError> {
        self.name = self.name.trim().to_owned();
        if self.name.is_empty() {
            return Err(ProductInputError::MissingName);
        }
        if self.price.is_negative() {
            return Err(ProductInputError::NegativePrice);
        }
        if !self.price.is_storable() {
            return Err(ProductInputError::UnstorablePrice);
        }
        if self.count_in_stock < 0 {
            return Err(ProductInputError::NegativeStock);
        }
        Ok(self)
    }
}

impl Product {
    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }
}
