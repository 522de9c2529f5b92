//! Domain models for the shop server.
//!
//! Catalog and order types live in `online-shop-core`; this module holds the
//! account types that only the server handles.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys};
pub use user::{User, UserUpdate};
