//! Authentication routes: login, logout, registration, password reset and
//! email verification.

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::{error, info};

use crate::{ApiError, AppState, middleware::auth::AuthUser};
use glimpse_shared::UserRead;
use glimpse_shared::auth::{
    BearerToken, ForgotPasswordRequest, LoginForm, RegisterRequest, RequestVerifyRequest,
    ResetPasswordRequest, VerifyRequest,
};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/jwt/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/request-verify-token", post(request_verify_token))
        .route("/auth/verify", post(verify))
}

/// Auth routes that need a bearer token.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/jwt/logout", post(logout))
}

/// POST /auth/jwt/login - Exchange credentials for a bearer token.
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<BearerToken>, ApiError> {
    let user = state.auth.authenticate(&form.username, &form.password).await?;
    let token = state.auth.issue_token(&user)?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(BearerToken::new(token)))
}

/// POST /auth/jwt/logout - Tokens are stateless; this only acknowledges.
async fn logout(auth: AuthUser) -> StatusCode {
    info!(user_id = %auth.user_id(), "User logged out");
    StatusCode::NO_CONTENT
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.register(&payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(UserRead::from(user))))
}

/// POST /auth/forgot-password - Always 202 so accounts cannot be probed.
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if let Some(issued) = state.auth.request_reset(&payload.email).await? {
        if let Err(e) = state
            .email
            .send_password_reset_email(&issued.email, &issued.token)
            .await
        {
            error!(error = %e, user_id = %issued.user_id, "Failed to send reset email");
        }
    }
    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/reset-password - Set a new password with a reset token.
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<UserRead>, ApiError> {
    let user = state
        .auth
        .confirm_reset(&payload.token, &payload.password)
        .await?;
    Ok(Json(user.into()))
}

/// POST /auth/request-verify-token - Always 202.
async fn request_verify_token(
    State(state): State<AppState>,
    Json(payload): Json<RequestVerifyRequest>,
) -> Result<StatusCode, ApiError> {
    if let Some(issued) = state.auth.request_verify(&payload.email).await? {
        if let Err(e) = state
            .email
            .send_verification_email(&issued.email, &issued.token)
            .await
        {
            error!(error = %e, user_id = %issued.user_id, "Failed to send verification email");
        }
    }
    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/verify - Mark the account behind a verification token verified.
async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<UserRead>, ApiError> {
    let user = state.auth.verify_email(&payload.token).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
