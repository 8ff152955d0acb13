//! Authentication route handlers.
//!
//! Registration and login are deliberately thin: validation and password
//! handling live in [`AuthService`], session establishment here.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, MessageBody, Result};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::SessionUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

use super::UserResponse;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/register - create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = AuthService::new(state.pool())
        .register(&body.username, &body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login - verify credentials and establish a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.pool())
        .login(&body.username, &body.password)
        .await?;

    let session_user = SessionUser {
        id: user.id,
        username: user.username.as_str().to_owned(),
    };
    set_current_user(&session, &session_user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to establish session: {e}")))?;

    Ok(Json(user.into()))
}

/// POST /auth/logout - clear the session.
pub async fn logout(session: Session) -> Result<Json<MessageBody>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    Ok(Json(MessageBody::new("Logged out.")))
}

/// GET /auth/me - the authenticated user.
pub async fn me(RequireAuth(actor): RequireAuth) -> Json<UserResponse> {
    Json(actor.into())
}
