//! Command implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod migrate;
pub mod orders;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use online_shop_core::access::Caller;
use online_shop_core::{Role, UserId};
use online_shop_server::db;

/// Errors shared by every database-backed command.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: SHOP_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the shop database named by `SHOP_DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConnectError` if the URL is missing or the pool cannot connect.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::debug!("Connecting to shop database...");
    Ok(db::create_pool(&database_url).await?)
}

/// The shell operator. Has admin capability but no account of its own.
pub const OPERATOR: Caller = Caller::new(UserId::new(0), Role::Admin);
