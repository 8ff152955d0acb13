//! Authentication middleware and extractors.
//!
//! Provides the `RequireAuth` extractor that resolves the request's session
//! into a [`CurrentUser`], the explicit actor value every protected handler
//! receives. Role memberships are loaded from the database on each request,
//! so a revoked role stops working immediately, without waiting for the
//! session to expire.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::db::{GroupRepository, UserRepository};
use crate::error::MessageBody;
use crate::models::{CurrentUser, SessionUser, session_keys};
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(actor): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", actor.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but absent or broken.
pub enum AuthRejection {
    /// No (valid) session identity on the request.
    Unauthenticated,
    /// The identity could not be resolved against the store.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(MessageBody::new(
                    "Authentication credentials were not provided.",
                )),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageBody::new("Internal server error")),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthenticated)?;

        // Get the logged-in identity from the session
        let session_user: SessionUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::Unauthenticated)?;

        // Resolve the identity against the store. A session naming a deleted
        // user is treated as unauthenticated, not as an error.
        let user = UserRepository::new(state.pool())
            .get_by_id(session_user.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load session user");
                AuthRejection::Internal
            })?
            .ok_or(AuthRejection::Unauthenticated)?;

        let roles = GroupRepository::new(state.pool())
            .roles_for_user(user.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load role memberships");
                AuthRejection::Internal
            })?;

        Ok(Self(CurrentUser::from((user, roles))))
    }
}

/// Helper to set the current user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<SessionUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
