//! Menu item repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;

use sage_bistro_core::{CategoryId, MenuItemId};

use super::RepositoryError;
use crate::models::{Category, MenuItem};

/// Internal row type joining a menu item with its category.
#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: i32,
    title: String,
    price: Decimal,
    featured: bool,
    inventory: i32,
    category_id: i32,
    category_title: String,
    category_slug: String,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: MenuItemId::new(row.id),
            title: row.title,
            price: row.price,
            featured: row.featured,
            inventory: row.inventory,
            category: Category {
                id: CategoryId::new(row.category_id),
                title: row.category_title,
                slug: row.category_slug,
            },
        }
    }
}

const SELECT_MENU_ITEM: &str = r"
    SELECT m.id, m.title, m.price, m.featured, m.inventory,
           c.id AS category_id, c.title AS category_title, c.slug AS category_slug
    FROM bistro.menu_item m
    JOIN bistro.category c ON c.id = m.category_id
";

/// Sort order for menu item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOrdering {
    PriceAsc,
    PriceDesc,
    InventoryAsc,
    InventoryDesc,
}

impl MenuOrdering {
    /// Parse a `?ordering=` query value (`price`, `-price`, `inventory`,
    /// `-inventory`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price" => Some(Self::PriceAsc),
            "-price" => Some(Self::PriceDesc),
            "inventory" => Some(Self::InventoryAsc),
            "-inventory" => Some(Self::InventoryDesc),
            _ => None,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::PriceAsc => "m.price ASC, m.id ASC",
            Self::PriceDesc => "m.price DESC, m.id ASC",
            Self::InventoryAsc => "m.inventory ASC, m.id ASC",
            Self::InventoryDesc => "m.inventory DESC, m.id ASC",
        }
    }
}

/// New menu item values.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub title: String,
    pub price: Decimal,
    pub featured: bool,
    pub inventory: i32,
    pub category_id: CategoryId,
}

/// Partial update of a menu item; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct MenuItemChanges {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub featured: Option<bool>,
    pub inventory: Option<i32>,
    pub category_id: Option<CategoryId>,
}

/// Repository for menu item database operations.
pub struct MenuItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuItemRepository<'a> {
    /// Create a new menu item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List menu items, optionally filtered by category title and ordered.
    ///
    /// Without an explicit ordering, items come back in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category_title: Option<&str>,
        ordering: Option<MenuOrdering>,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        // The ORDER BY expression comes from the MenuOrdering enum, never
        // from user input.
        let order_sql = ordering.map_or("m.id ASC", MenuOrdering::sql);

        let rows = if let Some(title) = category_title {
            sqlx::query_as::<_, MenuItemRow>(&format!(
                "{SELECT_MENU_ITEM} WHERE c.title = $1 ORDER BY {order_sql}"
            ))
            .bind(title)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MenuItemRow>(&format!("{SELECT_MENU_ITEM} ORDER BY {order_sql}"))
                .fetch_all(self.pool)
                .await?
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a menu item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!("{SELECT_MENU_ITEM} WHERE m.id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, item: NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO bistro.menu_item (title, price, featured, inventory, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&item.title)
        .bind(item.price)
        .bind(item.featured)
        .bind(item.inventory)
        .bind(item.category_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(map_category_fk)?;

        self.get_by_id(MenuItemId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Apply changes to a menu item; `None` fields are left untouched.
    ///
    /// A full replace (PUT) passes every field as `Some`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: MenuItemId,
        changes: MenuItemChanges,
    ) -> Result<MenuItem, RepositoryError> {
        let updated: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE bistro.menu_item
            SET title = COALESCE($2, title),
                price = COALESCE($3, price),
                featured = COALESCE($4, featured),
                inventory = COALESCE($5, inventory),
                category_id = COALESCE($6, category_id)
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id.as_i32())
        .bind(changes.title)
        .bind(changes.price)
        .bind(changes.featured)
        .bind(changes.inventory)
        .bind(changes.category_id.map(|c| c.as_i32()))
        .fetch_optional(self.pool)
        .await
        .map_err(map_category_fk)?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a menu item by its ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: MenuItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bistro.menu_item WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a foreign-key violation on `category_id` to a `Conflict`.
fn map_category_fk(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict("category does not exist".to_owned());
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_parse() {
        assert_eq!(MenuOrdering::parse("price"), Some(MenuOrdering::PriceAsc));
        assert_eq!(MenuOrdering::parse("-price"), Some(MenuOrdering::PriceDesc));
        assert_eq!(
            MenuOrdering::parse("inventory"),
            Some(MenuOrdering::InventoryAsc)
        );
        assert_eq!(
            MenuOrdering::parse("-inventory"),
            Some(MenuOrdering::InventoryDesc)
        );
        assert_eq!(MenuOrdering::parse("title"), None);
        assert_eq!(MenuOrdering::parse(""), None);
    }
}
