//! Authentication extractors.
//!
//! The session stores only the user id. [`RequireAuth`] loads the account on
//! every request, so a deleted user is logged out and a role change applies
//! to the very next call.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, User, keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Rejects with 401 when there is no session user or the account no longer
/// exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(user): RequireAuth) -> Json<User> {
///     Json(user)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Extractor that requires an administrator.
///
/// 401 when not logged in, 403 when logged in without admin role.
pub struct RequireAdmin(pub User);

/// Extractor that loads the user if one is logged in.
pub struct OptionalAuth(pub Option<User>);

fn session(parts: &Parts) -> Result<&Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Internal("session layer missing".to_string()))
}

async fn load_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let session = session(parts)?;
    let current: Option<CurrentUser> = session
        .get(keys::CURRENT_USER)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;

    let Some(current) = current else {
        return Ok(None);
    };

    let user = UserRepository::new(state.pool()).get_by_id(current.id).await?;
    match user {
        Some(user) => {
            set_sentry_user(&user.id, Some(user.email.as_str()));
            Ok(Some(user))
        }
        None => {
            tracing::info!(user_id = %current.id, "session user no longer exists");
            clear_current_user(session)
                .await
                .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
            Ok(None)
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        load_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, please log in".to_string()))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "admin route refused");
            return Err(AppError::Forbidden("Administrator access required".to_string()));
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(load_user(parts, state).await?))
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(keys::CURRENT_USER, CurrentUser { id: user.id })
        .await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}
