//! Database operations for the shop `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! - `user` - Accounts with an Argon2 password hash and a role
//! - `product` - The catalog
//! - `order` / `order_item` - Orders and their frozen line snapshots
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p online-shop-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(message: &str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(message.to_owned());
        }
        RepositoryError::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the shop schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
