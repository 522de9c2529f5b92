//! Orders and their status flags.
//!
//! An order is created once from a cart snapshot and afterwards only its two
//! status flags change. Both flags are monotonic: there is no "unpay" or
//! "undeliver".
//!
//! ```text
//!              mark_paid            mark_delivered
//!   Pending ──────────────▶ Paid ──────────────────▶ Completed
//!      │                                                ▲
//!      └──────────▶ Delivered ──────────────────────────┘
//!      mark_delivered            mark_paid
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{AccessError, Caller};
use crate::cart::CartItem;
use crate::{OrderId, Price, ProductId, UserId};

/// Value used for address fields the checkout form does not ask for.
pub const UNSPECIFIED: &str = "Не указан";

/// Country recorded when the form leaves it blank.
pub const DEFAULT_COUNTRY: &str = "Россия";

/// A product line frozen at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    pub image: String,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.unit_price,
            image: item.image.clone(),
        }
    }
}

/// Where the order goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Who receives the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub full_name: String,
    pub phone: String,
}

/// Payment method label. Payment itself is simulated: the label is stored and
/// an administrator flips the paid flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Card payment online, the only method the storefront offers.
    pub const CARD_ONLINE: &str = "Картой онлайн";

    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::new(Self::CARD_ONLINE)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    /// Owner, `None` for guest checkout.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub contact: ContactInfo,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub total_price: Price,
}

/// Reasons a draft cannot become an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("order has no items")]
    NoItems,

    #[error("quantity for product {0} must be at least 1")]
    ZeroQuantity(ProductId),

    #[error("price for product {0} cannot be negative")]
    NegativePrice(ProductId),

    #[error("price for product {0} must have at most two decimal places and ten whole digits")]
    UnstorablePrice(ProductId),

    #[error("order total is too large")]
    Overflow,

    #[error("total {submitted} does not match the sum of the items ({expected})")]
    TotalMismatch { expected: Price, submitted: Price },
}

impl OrderDraft {
    /// `Σ(price × quantity)` over the snapshot lines, `None` on overflow.
    #[must_use]
    pub fn items_total(&self) -> Option<Price> {
        self.items.iter().try_fold(Price::ZERO, |total, item| {
            total.checked_add(item.price.checked_times(item.quantity)?)
        })
    }

    /// Check the draft is internally consistent.
    ///
    /// Prices are taken from the snapshot as submitted; they are not compared
    /// against the live catalog.
    ///
    /// # Errors
    ///
    /// Returns the first [`DraftError`] found.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.items.is_empty() {
            return Err(DraftError::NoItems);
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(DraftError::ZeroQuantity(item.product_id));
            }
            if item.price.is_negative() {
                return Err(DraftError::NegativePrice(item.product_id));
            }
            if !item.price.is_storable() {
                return Err(DraftError::UnstorablePrice(item.product_id));
            }
        }
        let expected = self
            .items_total()
            .filter(Price::is_storable)
            .ok_or(DraftError::Overflow)?;
        if expected != self.total_price {
            return Err(DraftError::TotalMismatch {
                expected,
                submitted: self.total_price,
            });
        }
        Ok(())
    }
}

/// Outcome of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The flag was set by this call.
    Applied,
    /// The flag was already set; nothing changed.
    AlreadySet,
}

/// Combined view of the two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Delivered,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub user_id: Option<UserId>,
    pub contact: ContactInfo,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_price: Price,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A fresh, unpaid and undelivered order built from `draft`.
    #[must_use]
    pub fn from_draft(id: OrderId, draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            items: draft.items,
            user_id: draft.user_id,
            contact: draft.contact,
            shipping_address: draft.shipping_address,
            payment_method: draft.payment_method,
            total_price: draft.total_price,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the paid flag. A repeated call keeps the first `paid_at`.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Transition {
        if self.is_paid {
            return Transition::AlreadySet;
        }
        self.is_paid = true;
        self.paid_at = Some(now);
        self.updated_at = now;
        Transition::Applied
    }

    /// Set the delivered flag. A repeated call keeps the first `delivered_at`.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Transition {
        if self.is_delivered {
            return Transition::AlreadySet;
        }
        self.is_delivered = true;
        self.delivered_at = Some(now);
        self.updated_at = now;
        Transition::Applied
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        match (self.is_paid, self.is_delivered) {
            (false, false) => OrderStatus::Pending,
            (true, false) => OrderStatus::Paid,
            (false, true) => OrderStatus::Delivered,
            (true, true) => OrderStatus::Completed,
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }

    /// Owners and administrators may read an order.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Forbidden`] for anyone else, including every
    /// non-admin caller on a guest order.
    pub fn ensure_readable_by(&self, caller: &Caller) -> Result<(), AccessError> {
        if caller.is_admin() || self.is_owned_by(caller.user_id) {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Duration;

    use super::*;
    use crate::Role;

    pub(crate) fn draft(user_id: Option<UserId>) -> OrderDraft {
        let items = vec![
            OrderItem {
                product_id: ProductId::new(1),
                name: "Чай".to_owned(),
                quantity: 2,
                price: Price::from_units(100),
                image: String::new(),
            },
            OrderItem {
                product_id: ProductId::new(2),
                name: "Мёд".to_owned(),
                quantity: 1,
                price: Price::from_units(350),
                image: String::new(),
            },
        ];
        OrderDraft {
            items,
            user_id,
            contact: ContactInfo {
                full_name: "Иван Петров".to_owned(),
                phone: "+7 900 000-00-00".to_owned(),
            },
            shipping_address: ShippingAddress {
                address: "ул. Ленина, 1".to_owned(),
                city: UNSPECIFIED.to_owned(),
                postal_code: UNSPECIFIED.to_owned(),
                country: DEFAULT_COUNTRY.to_owned(),
            },
            payment_method: PaymentMethod::default(),
            total_price: Price::from_units(550),
        }
    }

    fn order(user_id: Option<UserId>) -> Order {
        Order::from_draft(OrderId::new(1), draft(user_id), Utc::now())
    }

    #[test]
    fn test_valid_draft() {
        assert_eq!(draft(None).validate(), Ok(()));
    }

    #[test]
    fn test_draft_rejections() {
        let mut empty = draft(None);
        empty.items.clear();
        empty.total_price = Price::ZERO;
        assert_eq!(empty.validate(), Err(DraftError::NoItems));

        let mut zero = draft(None);
        zero.items[0].quantity = 0;
        assert_eq!(
            zero.validate(),
            Err(DraftError::ZeroQuantity(ProductId::new(1)))
        );

        let mut negative = draft(None);
        negative.items[1].price = Price::from_units(-350);
        assert_eq!(
            negative.validate(),
            Err(DraftError::NegativePrice(ProductId::new(2)))
        );

        let mut mismatch = draft(None);
        mismatch.total_price = Price::from_units(1);
        assert!(matches!(
            mismatch.validate(),
            Err(DraftError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn test_huge_prices_are_rejected_without_panicking() {
        let mut max = draft(None);
        max.items[0].price = Price::new(rust_decimal::Decimal::MAX);
        assert_eq!(
            max.validate(),
            Err(DraftError::UnstorablePrice(ProductId::new(1)))
        );

        let mut overflow = draft(None);
        overflow.items[0].price = Price::max_storable();
        overflow.items[0].quantity = u32::MAX;
        assert_eq!(overflow.validate(), Err(DraftError::Overflow));
    }

    #[test]
    fn test_prices_must_fit_storage() {
        let mut sub_kopeck = draft(None);
        sub_kopeck.items[0].price = Price::new(rust_decimal::Decimal::new(5, 3));
        sub_kopeck.items[0].quantity = 1;
        sub_kopeck.items.truncate(1);
        sub_kopeck.total_price = Price::new(rust_decimal::Decimal::new(5, 3));
        assert_eq!(
            sub_kopeck.validate(),
            Err(DraftError::UnstorablePrice(ProductId::new(1)))
        );

        let mut eleven_digits = draft(None);
        eleven_digits.items[1].price = Price::from_units(10_000_000_000);
        eleven_digits.total_price = Price::from_units(10_000_000_200);
        assert_eq!(
            eleven_digits.validate(),
            Err(DraftError::UnstorablePrice(ProductId::new(2)))
        );

        let mut total_too_large = draft(None);
        total_too_large.items[0].price = Price::max_storable();
        assert_eq!(total_too_large.validate(), Err(DraftError::Overflow));

        let mut kopecks = draft(None);
        kopecks.items[1].price = Price::new(rust_decimal::Decimal::new(34_999, 2));
        kopecks.total_price = Price::new(rust_decimal::Decimal::new(54_999, 2));
        assert_eq!(kopecks.validate(), Ok(()));
    }

    #[test]
    fn test_new_order_is_pending() {
        let order = order(None);
        assert!(!order.is_paid);
        assert!(!order.is_delivered);
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_mark_paid_is_idempotent() {
        let mut order = order(None);
        let first = Utc::now();
        assert_eq!(order.mark_paid(first), Transition::Applied);
        assert!(order.is_paid);
        assert_eq!(order.paid_at, Some(first));

        let later = first + Duration::minutes(5);
        assert_eq!(order.mark_paid(later), Transition::AlreadySet);
        assert!(order.is_paid);
        assert_eq!(order.paid_at, Some(first));
    }

    #[test]
    fn test_flags_are_independent() {
        let mut order = order(None);
        order.mark_delivered(Utc::now());
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(!order.is_paid);

        order.mark_paid(Utc::now());
        assert_eq!(order.status(), OrderStatus::Completed);
        assert_eq!(order.mark_delivered(Utc::now()), Transition::AlreadySet);
    }

    #[test]
    fn test_read_access() {
        let owner = Caller::new(UserId::new(1), Role::User);
        let stranger = Caller::new(UserId::new(2), Role::User);
        let admin = Caller::new(UserId::new(3), Role::Admin);

        let owned = order(Some(owner.user_id));
        assert!(owned.ensure_readable_by(&owner).is_ok());
        assert!(owned.ensure_readable_by(&admin).is_ok());
        assert_eq!(
            owned.ensure_readable_by(&stranger),
            Err(AccessError::Forbidden)
        );

        let guest = order(None);
        assert!(guest.ensure_readable_by(&admin).is_ok());
        assert_eq!(guest.ensure_readable_by(&owner), Err(AccessError::Forbidden));
    }

    #[test]
    fn test_draft_payment_method_defaults() {
        let mut json = serde_json::to_value(draft(None)).unwrap();
        json.as_object_mut().unwrap().remove("payment_method");
        let parsed: OrderDraft = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.payment_method.as_str(), PaymentMethod::CARD_ONLINE);
    }
}
