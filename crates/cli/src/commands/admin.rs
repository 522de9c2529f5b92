//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new administrator
//! shop-cli admin create -e admin@example.ru -n "Admin Name" -p 'long password'
//!
//! # Grant admin to an existing account
//! shop-cli admin promote -e user@example.ru
//! ```

use online_shop_core::{Email, Role};
use online_shop_server::db::{RepositoryError, UserRepository};
use online_shop_server::services::{AuthError, AuthService};

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] online_shop_core::EmailError),

    #[error("No user with email: {0}")]
    UnknownUser(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new administrator account.
///
/// # Errors
///
/// Returns `AdminError::Auth` if the input is invalid or the email is taken.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    let user = AuthService::new(&pool)
        .register(name, email, password, Role::Admin)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}

/// Give an existing account the admin role.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if no account has that email.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let pool = super::connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&email, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownUser(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!("{} ({}) is now an administrator", user.name, user.email);
    Ok(())
}
