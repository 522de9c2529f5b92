//! User administration route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};
use tracing::instrument;

use online_shop_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{User, UserUpdate};
use crate::state::AppState;

/// GET /api/users
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

/// GET /api/users/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    id: std::result::Result<Path<UserId>, PathRejection>,
) -> Result<Json<User>> {
    let Path(id) = id?;
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// PUT /api/users/{id}
#[instrument(skip(state, admin, id, update), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    id: std::result::Result<Path<UserId>, PathRejection>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>> {
    let Path(id) = id?;
    let user = UserRepository::new(state.pool()).update(id, &update).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "user updated");
    Ok(Json(user))
}

/// DELETE /api/users/{id}
#[instrument(skip(state, admin, id), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    id: std::result::Result<Path<UserId>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    if id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    UserRepository::new(state.pool()).delete(id).await?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
