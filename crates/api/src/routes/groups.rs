//! Role management route handlers.
//!
//! All of these are manager-only. The role is named by the path segment
//! (`manager` or `delivery-crew`); an unknown segment is a 404, not a 400 -
//! `/groups/waiter/users` is a resource that does not exist.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use sage_bistro_core::{Role, UserId};

use crate::authz::{Action, authorize};
use crate::db::{GroupRepository, UserRepository};
use crate::error::{AppError, MessageBody, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::UserResponse;

/// Add-member request body.
///
/// `username` is optional so that its absence maps to the 400 message below
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub username: Option<String>,
}

fn parse_role(segment: &str) -> Result<Role> {
    segment
        .parse::<Role>()
        .map_err(|_| AppError::NotFound("Group not found.".to_owned()))
}

/// GET /groups/{role}/users - all members of the role group.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(role): Path<String>,
) -> Result<Json<Vec<UserResponse>>> {
    authorize(&actor, Action::ManageRoles).require()?;
    let role = parse_role(&role)?;

    let members = GroupRepository::new(state.pool()).members(role).await?;

    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// POST /groups/{role}/users - add a user to the role group by username.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(role): Path<String>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MessageBody>)> {
    authorize(&actor, Action::ManageRoles).require()?;
    let role = parse_role(&role)?;

    let Some(username) = body.username else {
        return Err(AppError::Validation("Username not provided.".to_owned()));
    };

    let user = UserRepository::new(state.pool())
        .get_by_username(&username)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("User with username {username} does not exist."))
        })?;

    let groups = GroupRepository::new(state.pool());
    if groups.is_member(user.id, role).await? {
        return Err(AppError::Validation(format!(
            "{} already {}",
            user.username,
            role.group_name()
        )));
    }

    groups.add_member(user.id, role).await?;

    tracing::info!(user = %user.username, role = %role, actor = %actor.username, "Role granted");

    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new(format!(
            "{} added to {} group.",
            user.username,
            role.group_name()
        ))),
    ))
}

/// DELETE /groups/{role}/users/{id} - remove a user from the role group.
///
/// 404 covers both "no such user" and "user is not a member".
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path((role, user_id)): Path<(String, UserId)>,
) -> Result<Json<MessageBody>> {
    authorize(&actor, Action::ManageRoles).require()?;
    let role = parse_role(&role)?;

    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} does not exist.")))?;

    let removed = GroupRepository::new(state.pool())
        .remove_member(user.id, role)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "User {} is not a member of the {} group.",
            user.username,
            role.group_name()
        )));
    }

    tracing::info!(user = %user.username, role = %role, actor = %actor.username, "Role revoked");

    Ok(Json(MessageBody::new(format!(
        "User {} removed from {} group.",
        user.username,
        role.group_name()
    ))))
}
