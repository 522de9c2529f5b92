//! User repository for database operations.

use sqlx::PgPool;

use online_shop_core::{Email, Role, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{User, UserUpdate};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO shop.user (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("email already exists"))
    }

    /// All users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.user ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    /// Apply an administrative edit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE shop.user
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 role = COALESCE($4, role),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name())
        .bind(update.email.as_ref())
        .bind(update.role)
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique("email already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Change a user's role by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that email.
    pub async fn set_role(&self, email: &Email, role: Role) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE shop.user SET role = $2, updated_at = NOW()
             WHERE email = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a user. Their orders stay, detached from the account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
