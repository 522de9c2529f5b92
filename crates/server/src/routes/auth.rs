//! Authentication route handlers.
//!
//! JSON endpoints for email/password accounts. A successful register or login
//! stores the user id in the session cookie.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use online_shop_core::Role;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, user)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Create an account and log it in.
///
/// POST /api/auth/register
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(&body.name, &body.email, &body.password, Role::User)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
///
/// POST /api/auth/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "login failed"))?;
    start_session(&session, &user).await?;

    Ok(Json(user))
}

/// Clear the session.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Current user's profile.
///
/// GET /api/auth/me
pub async fn me(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}
