//! Business logic services for the shop server.
//!
//! # Services
//!
//! - `auth` - Password registration and login
//! - `orders` - [`online_shop_core::store::OrderStore`] over `PostgreSQL`

pub mod auth;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use orders::PgOrderStore;
