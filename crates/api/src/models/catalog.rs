//! Catalog domain types.

use rust_decimal::Decimal;

use sage_bistro_core::{CategoryId, MenuItemId};

/// A menu category.
#[derive(Debug, Clone)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display title.
    pub title: String,
    /// URL-safe identifier, unique per category.
    pub slug: String,
}

/// A menu item, belonging to exactly one category.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Unique menu item ID.
    pub id: MenuItemId,
    /// Display title.
    pub title: String,
    /// Current unit price.
    pub price: Decimal,
    /// Whether the item is currently featured.
    pub featured: bool,
    /// Units on hand; listings can be ordered by it.
    pub inventory: i32,
    /// The owning category.
    pub category: Category,
}
