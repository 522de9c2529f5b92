//! Submit the terminal cart as an order.
//!
//! # Usage
//!
//! ```bash
//! shop-cli checkout --full-name "Анна Смирнова" --phone "+7 912 345-67-89" \
//!     --address "пр. Мира, 10" [--city Казань] [--user-email anna@example.ru]
//! ```

use online_shop_core::cart::{CartSession, CartStorage};
use online_shop_core::checkout::{ShippingForm, build_draft, submit_order};
use online_shop_core::order::PaymentMethod;
use online_shop_core::{Email, UserId};
use online_shop_server::db::UserRepository;
use online_shop_server::services::PgOrderStore;

/// Submit the cart. On success the cart file is emptied.
///
/// # Errors
///
/// Returns an error for an empty cart, blank form fields, an unknown
/// `--user-email`, or a database failure. The cart is kept in every case.
pub async fn run(
    form: ShippingForm,
    user_email: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = super::cart::open();
    place_order(&mut cart, &form, user_email).await
}

async fn place_order<S: CartStorage>(
    cart: &mut CartSession<S>,
    form: &ShippingForm,
    user_email: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Empty cart and blank fields are reported before any connection attempt.
    build_draft(cart, form, PaymentMethod::default(), None)?;

    let pool = super::connect().await?;

    let user_id = match user_email {
        Some(email) => Some(resolve_user(&pool, &email).await?),
        None => None,
    };

    let store = PgOrderStore::new(pool);
    let order_id = submit_order(cart, form, PaymentMethod::default(), user_id, &store).await?;

    tracing::info!("Order #{order_id} placed");
    Ok(())
}

async fn resolve_user(
    pool: &sqlx::PgPool,
    email: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let user = UserRepository::new(pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| format!("No user with email: {email}"))?;
    Ok(user.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use online_shop_core::cart::MemoryCartStorage;
    use online_shop_core::catalog::Product;
    use online_shop_core::checkout::{CheckoutError, FormField};
    use online_shop_core::{Price, ProductId};

    use super::*;

    fn form() -> ShippingForm {
        ShippingForm {
            full_name: "Анна Смирнова".to_owned(),
            phone: "+7 912 345-67-89".to_owned(),
            address: "пр. Мира, 10".to_owned(),
            ..ShippingForm::default()
        }
    }

    async fn checkout_error(
        cart: &mut CartSession<MemoryCartStorage>,
        form: &ShippingForm,
    ) -> CheckoutError {
        let err = place_order(cart, form, Some("anna@example.ru".to_owned()))
            .await
            .unwrap_err();
        err.downcast_ref::<CheckoutError>()
            .cloned()
            .unwrap_or_else(|| panic!("expected a checkout error, got: {err}"))
    }

    #[tokio::test]
    async fn test_empty_cart_is_reported_before_connecting() {
        let mut cart = CartSession::load(MemoryCartStorage::new());
        assert_eq!(checkout_error(&mut cart, &form()).await, CheckoutError::NoItems);
    }

    #[tokio::test]
    async fn test_blank_fields_are_reported_before_connecting() {
        let mut cart = CartSession::load(MemoryCartStorage::new());
        cart.add_item(
            &Product {
                id: ProductId::new(3),
                name: "Кружка".to_owned(),
                price: Price::from_units(450),
                description: String::new(),
                image: String::new(),
                category: "Посуда".to_owned(),
                count_in_stock: 5,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            1,
        );
        let blank = ShippingForm {
            address: " ".to_owned(),
            ..form()
        };

        assert_eq!(
            checkout_error(&mut cart, &blank).await,
            CheckoutError::IncompleteForm {
                missing: vec![FormField::Address]
            }
        );
        assert!(!cart.is_empty());
    }
}
