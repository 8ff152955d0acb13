//! Staff management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a manager account
//! bistro-cli staff create -u maria -e maria@example.com -p 'a long password' -r manager
//!
//! # Put an existing user on the delivery crew
//! bistro-cli staff grant -u joe -r delivery-crew
//! ```
//!
//! # Environment Variables
//!
//! - `BISTRO_DATABASE_URL` - `PostgreSQL` connection string

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use sage_bistro_core::{Role, Username, UsernameError};

/// Errors that can occur during staff operations.
#[derive(Debug, Error)]
pub enum StaffError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least 8 characters")]
    WeakPassword,

    /// User already exists.
    #[error("User already exists with username: {0}")]
    UserExists(String),

    /// User not found.
    #[error("No user with username: {0}")]
    UserNotFound(String),

    /// Membership already present.
    #[error("{0} is already in the {1} group")]
    AlreadyMember(String, &'static str),

    /// Membership absent.
    #[error("{0} is not in the {1} group")]
    NotAMember(String, &'static str),

    /// Password hashing error.
    #[error("Password hashing failed")]
    PasswordHash,
}

async fn connect() -> Result<PgPool, StaffError> {
    let database_url =
        super::database_url().ok_or(StaffError::MissingEnvVar("BISTRO_DATABASE_URL"))?;
    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}

async fn user_id_by_username(pool: &PgPool, username: &str) -> Result<i32, StaffError> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM bistro.user_account WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StaffError::UserNotFound(username.to_owned()))
}

async fn is_member(pool: &PgPool, user_id: i32, role: Role) -> Result<bool, StaffError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r"
        SELECT EXISTS (
            SELECT 1
            FROM bistro.user_role_group ug
            JOIN bistro.role_group g ON g.id = ug.group_id
            WHERE ug.user_id = $1 AND g.name = $2
        )
        ",
    )
    .bind(user_id)
    .bind(role.group_name())
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

async fn insert_membership(pool: &PgPool, user_id: i32, role: Role) -> Result<(), StaffError> {
    sqlx::query(
        r"
        INSERT INTO bistro.user_role_group (user_id, group_id)
        SELECT $1, g.id FROM bistro.role_group g WHERE g.name = $2
        ",
    )
    .bind(user_id)
    .bind(role.group_name())
    .execute(pool)
    .await?;
    Ok(())
}

/// Create a new account, optionally granting a role.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `StaffError` for invalid input, a duplicate username, or a
/// database failure.
pub async fn create_user(
    username: &str,
    email: &str,
    password: &str,
    role: Option<Role>,
) -> Result<i32, StaffError> {
    let username = Username::parse(username)?;

    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(StaffError::InvalidEmail(email.to_owned()));
    }

    if password.len() < 8 {
        return Err(StaffError::WeakPassword);
    }

    let pool = connect().await?;

    // Check if user already exists
    let existing =
        sqlx::query_scalar::<_, i32>("SELECT id FROM bistro.user_account WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(StaffError::UserExists(username.into_inner()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| StaffError::PasswordHash)?
        .to_string();

    let mut tx = pool.begin().await?;

    let user_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO bistro.user_account (username, email)
        VALUES ($1, $2)
        RETURNING id
        ",
    )
    .bind(username.as_str())
    .bind(email)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO bistro.user_password (user_id, password_hash) VALUES ($1, $2)")
        .bind(user_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("User created: ID {}, username {}", user_id, username);

    if let Some(role) = role {
        insert_membership(&pool, user_id, role).await?;
        tracing::info!("Granted {} to {}", role, username);
    }

    Ok(user_id)
}

/// Add an existing user to a role group.
///
/// # Errors
///
/// Returns `StaffError::UserNotFound` for an unknown username and
/// `StaffError::AlreadyMember` when the membership already exists.
pub async fn grant_role(username: &str, role: Role) -> Result<(), StaffError> {
    let pool = connect().await?;
    let user_id = user_id_by_username(&pool, username).await?;

    if is_member(&pool, user_id, role).await? {
        return Err(StaffError::AlreadyMember(
            username.to_owned(),
            role.group_name(),
        ));
    }

    insert_membership(&pool, user_id, role).await?;
    tracing::info!("Granted {} to {}", role, username);
    Ok(())
}

/// Remove a user from a role group.
///
/// # Errors
///
/// Returns `StaffError::UserNotFound` for an unknown username and
/// `StaffError::NotAMember` when there is no membership to remove.
pub async fn revoke_role(username: &str, role: Role) -> Result<(), StaffError> {
    let pool = connect().await?;
    let user_id = user_id_by_username(&pool, username).await?;

    let result = sqlx::query(
        r"
        DELETE FROM bistro.user_role_group ug
        USING bistro.role_group g
        WHERE ug.group_id = g.id AND ug.user_id = $1 AND g.name = $2
        ",
    )
    .bind(user_id)
    .bind(role.group_name())
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StaffError::NotAMember(
            username.to_owned(),
            role.group_name(),
        ));
    }

    tracing::info!("Revoked {} from {}", role, username);
    Ok(())
}
