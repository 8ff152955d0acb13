//! Cart domain types.

use rust_decimal::Decimal;

use sage_bistro_core::{CartLineId, MenuItemId, UserId};

/// A pending cart line: one row per (user, menu item).
///
/// Exists only between "added to cart" and "order placed or cart cleared".
/// `price` is always `quantity × unit_price`, computed by
/// [`sage_bistro_core::money::line_price`] at write time; it is never
/// accepted from a client and never updated independently.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Unique cart line ID.
    pub id: CartLineId,
    /// Owning user.
    pub user_id: UserId,
    /// The menu item in the cart.
    pub menu_item_id: MenuItemId,
    /// Number of units.
    pub quantity: i32,
    /// Unit price at the time the line was added.
    pub unit_price: Decimal,
    /// Line total, `quantity × unit_price`.
    pub price: Decimal,
}
