//! User routes: the caller's own account and superuser administration.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use glimpse_shared::{AppError, UserRead, UserUpdate};
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState, middleware::auth::AuthUser};

/// Creates the users router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).patch(update_me))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn require_superuser(auth: &AuthUser) -> Result<(), ApiError> {
    if auth.is_superuser() {
        Ok(())
    } else {
        Err(ApiError(AppError::Forbidden("Superuser required".to_string())))
    }
}

/// GET /users/me
async fn get_me(auth: AuthUser) -> Json<UserRead> {
    Json(UserRead::from(auth.user()))
}

/// PATCH /users/me - Only email and password can be changed here.
async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserRead>, ApiError> {
    let user = state
        .auth
        .update_user(auth.user_id(), payload.self_service())
        .await?;
    Ok(Json(user.into()))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRead>, ApiError> {
    require_superuser(&auth)?;
    let user = state.auth.get_user(id).await?;
    Ok(Json(user.into()))
}

/// PATCH /users/{id} - Superusers may also change flags.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserRead>, ApiError> {
    require_superuser(&auth)?;
    let user = state.auth.update_user(id, payload).await?;

    info!(admin_id = %auth.user_id(), user_id = %id, "User updated by superuser");
    Ok(Json(user.into()))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_superuser(&auth)?;
    state.auth.delete_user(id).await?;

    info!(admin_id = %auth.user_id(), user_id = %id, "User deleted by superuser");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
