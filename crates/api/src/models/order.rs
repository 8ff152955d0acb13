//! Order domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use sage_bistro_core::{MenuItemId, OrderId, OrderLineId, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// The purchaser.
    pub user_id: UserId,
    /// Assigned delivery crew member, when set by a manager.
    pub delivery_crew_id: Option<UserId>,
    /// Delivered flag (false until the assigned crew member flips it).
    pub status: bool,
    /// The day the order was placed.
    pub order_date: NaiveDate,
    /// Sum of the line prices at placement time; never recomputed.
    pub total: Decimal,
}

/// An immutable snapshot of a cart line, created at order-placement time.
#[derive(Debug, Clone)]
pub struct OrderLine {
    /// Unique order line ID.
    pub id: OrderLineId,
    /// The owning order.
    pub order_id: OrderId,
    /// The ordered menu item.
    pub menu_item_id: MenuItemId,
    /// Number of units.
    pub quantity: i32,
    /// Line total copied from the cart line.
    pub price: Decimal,
}
