//! Cart repository for database operations.
//!
//! Every operation is scoped by the owning user's id; there is no way to
//! read or mutate another user's cart through this repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use sage_bistro_core::{CartLineId, MenuItemId, UserId, money};

use super::RepositoryError;
use crate::models::CartLine;

/// Internal row type for cart line queries.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    user_id: i32,
    menu_item_id: i32,
    quantity: i32,
    unit_price: Decimal,
    price: Decimal,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartLineId::new(row.id),
            user_id: UserId::new(row.user_id),
            menu_item_id: MenuItemId::new(row.menu_item_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
            price: row.price,
        }
    }
}

/// Repository for cart line database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the user's cart lines in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, user_id, menu_item_id, quantity, unit_price, price
            FROM bistro.cart_line
            WHERE user_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add a line to the user's cart.
    ///
    /// The line price is computed here from quantity × unit price
    /// ([`money::line_price`]); it is not a parameter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a line for
    /// this menu item, or if the menu item does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_line(
        &self,
        user: UserId,
        menu_item: MenuItemId,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<CartLine, RepositoryError> {
        let price = money::line_price(quantity, unit_price);

        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            INSERT INTO bistro.cart_line (user_id, menu_item_id, quantity, unit_price, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, menu_item_id, quantity, unit_price, price
            ",
        )
        .bind(user.as_i32())
        .bind(menu_item.as_i32())
        .bind(i64::from(quantity))
        .bind(unit_price)
        .bind(price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return RepositoryError::Conflict("menu item is already in the cart".to_owned());
                }
                if db_err.is_foreign_key_violation() {
                    return RepositoryError::Conflict("menu item does not exist".to_owned());
                }
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Delete all of the user's cart lines.
    ///
    /// # Returns
    ///
    /// The number of lines removed (zero when the cart was already empty).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_for_user(&self, user: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM bistro.cart_line WHERE user_id = $1")
            .bind(user.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
