//! Cart route handlers.
//!
//! Every operation acts on the caller's own cart; the actor's id is the only
//! user id these handlers ever pass down.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sage_bistro_core::{CartLineId, MenuItemId, UserId};

use crate::authz::{Action, authorize};
use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartLine;
use crate::state::AppState;

/// JSON shape of a cart line in responses.
#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: CartLineId,
    pub user: UserId,
    pub menuitem: MenuItemId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub price: Decimal,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            user: line.user_id,
            menuitem: line.menu_item_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            price: line.price,
        }
    }
}

/// Add-line request body. The line price is not a field here; it is always
/// computed server-side from quantity × unit price.
#[derive(Debug, Deserialize)]
pub struct AddCartLineRequest {
    pub menuitem: MenuItemId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// GET /cart/menu-items - the caller's cart lines.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> Result<Json<Vec<CartLineResponse>>> {
    authorize(&actor, Action::UseCart).require()?;

    let lines = CartRepository::new(state.pool())
        .list_for_user(actor.id)
        .await?;

    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

/// POST /cart/menu-items - add a line to the caller's cart.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(body): Json<AddCartLineRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>)> {
    authorize(&actor, Action::UseCart).require()?;

    if body.quantity == 0 {
        return Err(AppError::Validation(
            "Quantity must be at least 1.".to_owned(),
        ));
    }
    if body.unit_price < Decimal::ZERO {
        return Err(AppError::Validation(
            "Unit price cannot be negative.".to_owned(),
        ));
    }

    let line = CartRepository::new(state.pool())
        .add_line(actor.id, body.menuitem, body.quantity, body.unit_price)
        .await?;

    Ok((StatusCode::CREATED, Json(line.into())))
}

/// DELETE /cart/menu-items - clear the caller's cart.
///
/// Always answers `"ok"`, whether or not there was anything to remove.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> Result<Json<&'static str>> {
    authorize(&actor, Action::UseCart).require()?;

    let removed = CartRepository::new(state.pool())
        .clear_for_user(actor.id)
        .await?;

    tracing::debug!(user = %actor.username, removed, "Cart cleared");

    Ok(Json("ok"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cart_line_response_shape() {
        let line = CartLine {
            id: CartLineId::new(1),
            user_id: UserId::new(3),
            menu_item_id: MenuItemId::new(7),
            quantity: 2,
            unit_price: Decimal::from_str("9.50").unwrap(),
            price: Decimal::from_str("19.00").unwrap(),
        };

        let json = serde_json::to_value(CartLineResponse::from(line)).unwrap();
        assert_eq!(json["user"], 3);
        assert_eq!(json["menuitem"], 7);
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["unit_price"], "9.50");
        assert_eq!(json["price"], "19.00");
    }
}
