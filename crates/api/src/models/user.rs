//! User domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use sage_bistro_core::{Role, UserId, Username};

/// A registered user (domain type).
///
/// Customers and staff share this type; staff are distinguished only by
/// role-group membership.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login identifier.
    pub username: Username,
    /// Contact email address.
    pub email: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated actor of a request.
///
/// Built per request by the `RequireAuth` extractor: the session yields the
/// user id, and role memberships are loaded from the store so that
/// grants/revocations take effect immediately. Every operation takes the
/// actor as an explicit parameter; there is no ambient "current user".
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Unique user ID.
    pub id: UserId,
    /// Login identifier.
    pub username: Username,
    /// Contact email address.
    pub email: String,
    /// Role-group memberships at the time the request was authenticated.
    pub roles: BTreeSet<Role>,
}

impl CurrentUser {
    /// Whether the actor belongs to the given role group.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl From<(User, BTreeSet<Role>)> for CurrentUser {
    fn from((user, roles): (User, BTreeSet<Role>)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles,
        }
    }
}
