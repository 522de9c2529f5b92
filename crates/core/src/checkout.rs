//! Order submission: cart + shipping form → persisted order.
//!
//! Validation of the cart and the form happens locally, before the store is
//! called. The submitted prices are the ones held in the cart; they are not
//! re-read from the catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartSession, CartStorage};
use crate::order::{
    ContactInfo, DEFAULT_COUNTRY, OrderDraft, OrderItem, PaymentMethod, ShippingAddress,
    UNSPECIFIED,
};
use crate::store::{OrderStore, StoreError};
use crate::{OrderId, UserId};

/// Checkout form as filled in by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingForm {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Required form fields, used to report which ones are blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FullName,
    Phone,
    Address,
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FullName => "full name",
            Self::Phone => "phone",
            Self::Address => "address",
        })
    }
}

/// Why a checkout did not produce an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    NoItems,

    #[error("please fill in: {}", join_fields(.missing))]
    IncompleteForm { missing: Vec<FormField> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// Errors the shopper fixes by changing their input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoItems | Self::IncompleteForm { .. } | Self::Store(StoreError::Validation(_))
        )
    }
}

fn join_fields(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn filled(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl ShippingForm {
    /// Split the form into contact and address, filling defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::IncompleteForm`] listing every blank required field.
    pub fn validate(&self) -> Result<(ContactInfo, ShippingAddress), CheckoutError> {
        let full_name = filled(&self.full_name);
        let phone = filled(&self.phone);
        let address = filled(&self.address);

        let (Some(full_name), Some(phone), Some(address)) = (full_name, phone, address) else {
            let missing = [
                (FormField::FullName, &self.full_name),
                (FormField::Phone, &self.phone),
                (FormField::Address, &self.address),
            ]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();
            return Err(CheckoutError::IncompleteForm { missing });
        };

        let optional = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .and_then(filled)
                .unwrap_or_else(|| fallback.to_owned())
        };

        Ok((
            ContactInfo { full_name, phone },
            ShippingAddress {
                address,
                city: optional(&self.city, UNSPECIFIED),
                postal_code: optional(&self.postal_code, UNSPECIFIED),
                country: optional(&self.country, DEFAULT_COUNTRY),
            },
        ))
    }
}

/// Build the order draft for the current cart contents.
///
/// # Errors
///
/// Returns [`CheckoutError::NoItems`] for an empty cart and
/// [`CheckoutError::IncompleteForm`] for blank required fields.
pub fn build_draft<S: CartStorage>(
    cart: &CartSession<S>,
    form: &ShippingForm,
    payment_method: PaymentMethod,
    user_id: Option<UserId>,
) -> Result<OrderDraft, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::NoItems);
    }
    let (contact, shipping_address) = form.validate()?;

    Ok(OrderDraft {
        items: cart.items().iter().map(OrderItem::from).collect(),
        user_id,
        contact,
        shipping_address,
        payment_method,
        total_price: cart.total(),
    })
}

/// Submit the cart as an order.
///
/// On success the cart is cleared and the new order id returned. On any error
/// the cart is left as it was so the shopper can retry.
///
/// # Errors
///
/// Validation errors are returned before the store is contacted; store
/// failures come back as [`CheckoutError::Store`].
pub async fn submit_order<S, O>(
    cart: &mut CartSession<S>,
    form: &ShippingForm,
    payment_method: PaymentMethod,
    user_id: Option<UserId>,
    store: &O,
) -> Result<OrderId, CheckoutError>
where
    S: CartStorage,
    O: OrderStore,
{
    let draft = build_draft(cart, form, payment_method, user_id)?;
    let item_count = draft.items.len();

    let order = store.create_order(draft).await.inspect_err(|e| {
        tracing::warn!(error = %e, "order submission failed, cart kept");
    })?;

    tracing::info!(
        order_id = %order.id,
        items = item_count,
        total = %order.total_price,
        "order submitted"
    );
    cart.clear();
    Ok(order.id)
}
