//! Role-group repository for database operations.
//!
//! Roles are named groups (`Manager`, `Delivery crew`); membership is a
//! many-to-many relation with users. Interpretation of membership (who may
//! do what) lives in [`crate::authz`], not here.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sage_bistro_core::{Role, UserId, Username};

use super::RepositoryError;
use crate::models::User;

/// Internal row type for member listings.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: i32,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for User {
    type Error = RepositoryError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for role-group membership operations.
pub struct GroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GroupRepository<'a> {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All roles the user belongs to.
    ///
    /// Group names that don't map to a known role are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roles_for_user(&self, user: UserId) -> Result<BTreeSet<Role>, RepositoryError> {
        let names: Vec<String> = sqlx::query_scalar(
            r"
            SELECT g.name
            FROM bistro.role_group g
            JOIN bistro.user_role_group ug ON ug.group_id = g.id
            WHERE ug.user_id = $1
            ",
        )
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(names
            .iter()
            .filter_map(|n| Role::from_group_name(n))
            .collect())
    }

    /// Whether the user belongs to the role group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_member(&self, user: UserId, role: Role) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM bistro.user_role_group ug
                JOIN bistro.role_group g ON g.id = ug.group_id
                WHERE ug.user_id = $1 AND g.name = $2
            )
            ",
        )
        .bind(user.as_i32())
        .bind(role.group_name())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// All users in the role group, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored username is invalid.
    pub async fn members(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r"
            SELECT u.id, u.username, u.email, u.created_at, u.updated_at
            FROM bistro.user_account u
            JOIN bistro.user_role_group ug ON ug.user_id = u.id
            JOIN bistro.role_group g ON g.id = ug.group_id
            WHERE g.name = $1
            ORDER BY u.username ASC
            ",
        )
        .bind(role.group_name())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Add the user to the role group.
    ///
    /// Callers are expected to have checked membership first to produce a
    /// friendly "already a member" error; a concurrent duplicate insert still
    /// surfaces as `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user is already a member.
    /// Returns `RepositoryError::DataCorruption` if the role group row is
    /// missing (the seed migration creates both groups).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_member(&self, user: UserId, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO bistro.user_role_group (user_id, group_id)
            SELECT $1, g.id
            FROM bistro.role_group g
            WHERE g.name = $2
            ",
        )
        .bind(user.as_i32())
        .bind(role.group_name())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("already a member".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "role group {} is missing",
                role.group_name()
            )));
        }

        Ok(())
    }

    /// Remove the user from the role group.
    ///
    /// # Returns
    ///
    /// Returns `true` if a membership row was removed, `false` if the user
    /// was not a member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_member(&self, user: UserId, role: Role) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM bistro.user_role_group ug
            USING bistro.role_group g
            WHERE ug.group_id = g.id AND ug.user_id = $1 AND g.name = $2
            ",
        )
        .bind(user.as_i32())
        .bind(role.group_name())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
