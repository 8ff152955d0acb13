//! Database operations for the `bistro` `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `user_account` / `user_password` - Registered users and their hashes
//! - `role_group` / `user_role_group` - Named roles and memberships
//! - `category` / `menu_item` - The catalog
//! - `cart_line` - Pending per-user cart lines
//! - `customer_order` / `order_line` - Placed orders and their snapshots
//! - tower-sessions storage (created by the session store itself)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p sage-bistro-cli -- migrate
//! ```
//!
//! Queries use the runtime-bound sqlx API (`query_as`/`query_scalar`) with
//! `FromRow` row structs mapped into domain types via `TryFrom`.

pub mod cart;
pub mod groups;
pub mod menu_items;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use groups::GroupRepository;
pub use menu_items::{MenuItemRepository, MenuOrdering};
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username, unknown category).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
