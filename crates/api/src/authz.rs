//! Authorization policy.
//!
//! One capability check for the whole service: `authorize(actor, action)`.
//! Handlers never test group membership ad hoc; they pass the explicit actor
//! (from the `RequireAuth` extractor) and an [`Action`], and this module is
//! the only place role membership is interpreted.
//!
//! Order reads are scoped rather than allowed/denied outright:
//! [`order_scope`] yields the slice of orders an actor may list, and
//! [`can_view_order`] applies the same rule to a single order.

use sage_bistro_core::{Role, UserId};

use crate::error::AppError;
use crate::models::{CurrentUser, Order};

/// An operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read the menu (list or single item).
    ReadMenu,
    /// Create, update, or delete menu items.
    WriteMenu,
    /// List, add, or remove role-group members.
    ManageRoles,
    /// Read or mutate one's own cart.
    UseCart,
    /// Convert one's own cart into an order.
    PlaceOrder,
    /// Replace an order's delivery assignment and status.
    AssignOrder,
    /// Flip an assigned order's delivered flag.
    MarkOrderDelivered,
    /// Hard-delete an order.
    DeleteOrder,
}

/// The outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Turn a denial into the 403 error, for use with `?` in handlers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PermissionDenied` on `Deny`.
    pub fn require(self) -> Result<(), AppError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(AppError::PermissionDenied),
        }
    }
}

/// Which orders an actor may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Managers see every order.
    All,
    /// Delivery crew see orders assigned to them.
    AssignedTo(UserId),
    /// Everyone else sees their own orders.
    OwnedBy(UserId),
}

/// Decide whether the actor may perform the action.
#[must_use]
pub fn authorize(actor: &CurrentUser, action: Action) -> Decision {
    let allowed = match action {
        // Any authenticated actor
        Action::ReadMenu | Action::UseCart | Action::PlaceOrder => true,
        // Managers only
        Action::WriteMenu | Action::ManageRoles | Action::AssignOrder | Action::DeleteOrder => {
            actor.has_role(Role::Manager)
        }
        // Delivery crew only
        Action::MarkOrderDelivered => actor.has_role(Role::DeliveryCrew),
    };

    if allowed { Decision::Allow } else { Decision::Deny }
}

/// The order slice the actor may read.
///
/// A manager who also happens to be on the delivery crew sees everything;
/// manager wins over crew.
#[must_use]
pub fn order_scope(actor: &CurrentUser) -> OrderScope {
    if actor.has_role(Role::Manager) {
        OrderScope::All
    } else if actor.has_role(Role::DeliveryCrew) {
        OrderScope::AssignedTo(actor.id)
    } else {
        OrderScope::OwnedBy(actor.id)
    }
}

/// Whether the actor may read this particular order.
///
/// Same rule as [`order_scope`], applied to one order.
#[must_use]
pub fn can_view_order(actor: &CurrentUser, order: &Order) -> bool {
    match order_scope(actor) {
        OrderScope::All => true,
        OrderScope::AssignedTo(crew) => order.delivery_crew_id == Some(crew),
        OrderScope::OwnedBy(user) => order.user_id == user,
    }
}
