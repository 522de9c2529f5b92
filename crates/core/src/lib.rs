//! Online Shop Core - domain library.
//!
//! This crate holds the parts of the shop that do not depend on a web framework
//! or a database:
//! - `server` - REST backend (products, users, orders)
//! - `cli` - operator tooling and the terminal storefront client
//!
//! # Architecture
//!
//! The core crate contains types, the cart to order pipeline and the
//! [`store::OrderStore`] boundary trait. Persistence is reached only through
//! traits ([`cart::CartStorage`], [`store::OrderStore`]), so everything here
//! runs against in-memory implementations in tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, roles
//! - [`access`] - Caller identity and the privilege gate
//! - [`catalog`] - Products as the cart sees them
//! - [`cart`] - Client-local cart state and its persistence slot
//! - [`order`] - Orders, snapshots and the paid/delivered status machine
//! - [`checkout`] - Turning a cart and a shipping form into an order
//! - [`store`] - The order persistence boundary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod store;
pub mod types;

pub use types::*;
