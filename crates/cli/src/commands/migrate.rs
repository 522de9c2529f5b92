//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shop-cli migrate
//! ```
//!
//! Runs the shop schema migrations from `crates/server/migrations/`, then
//! creates the `tower_sessions` table used by the server's session store.

use tower_sessions_sqlx_store::PostgresStore;

use online_shop_server::db;

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the connection or any migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running shop migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
