//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Чай улун
//!     price: "450.00"
//!     category: Чай
//!     count_in_stock: 12
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use online_shop_core::catalog::ProductInput;
use online_shop_server::db::ProductRepository;

/// Contents of a product seed file.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub products: Vec<ProductInput>,
}

/// Parse and validate a seed file's contents.
///
/// Returns the products with their names trimmed, or one message per
/// rejected entry.
pub fn parse_products(content: &str) -> Result<Vec<ProductInput>, Vec<String>> {
    let seed: ProductSeed = serde_yaml::from_str(content).map_err(|e| vec![e.to_string()])?;

    let mut products = Vec::with_capacity(seed.products.len());
    let mut errors = Vec::new();
    for (index, input) in seed.products.into_iter().enumerate() {
        let label = if input.name.trim().is_empty() {
            format!("#{}", index + 1)
        } else {
            input.name.clone()
        };
        match input.validate() {
            Ok(valid) => products.push(valid),
            Err(e) => errors.push(format!("{label}: {e}")),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Insert every product from `file_path`.
///
/// The whole file is validated before anything is written.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or an insert fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;

    let products = match parse_products(&content) {
        Ok(products) => products,
        Err(errors) => {
            error!("Seed file validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);
    for input in &products {
        let product = repo.create(input).await?;
        info!(id = %product.id, name = %product.name, "Inserted product");
    }

    info!(count = products.len(), "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use online_shop_core::Price;

    use super::*;

    #[test]
    fn test_parse_valid_seed() {
        let products = parse_products(
            r#"
products:
  - name: " Чай улун "
    price: "450.00"
    category: Чай
    count_in_stock: 12
  - name: Мёд
    price: 700
"#,
        )
        .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Чай улун");
        assert_eq!(products[0].price, Price::from_units(450));
        assert_eq!(products[1].count_in_stock, 0);
    }

    #[test]
    fn test_parse_reports_every_bad_entry() {
        let errors = parse_products(
            r#"
products:
  - name: ""
    price: 10
  - name: Кружка
    price: -1
"#,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("#1"));
        assert!(errors[1].starts_with("Кружка"));
    }
}
