//! Order lifecycle route handlers.
//!
//! The core of the service: placing an order drains the caller's cart into
//! an immutable snapshot inside one transaction; reads are role-scoped;
//! assignment, delivery and deletion are role-gated through the policy
//! module.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sage_bistro_core::{MenuItemId, OrderId, Role, UserId};

use crate::authz::{Action, OrderScope, authorize, can_view_order, order_scope};
use crate::db::{GroupRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderLine};
use crate::state::AppState;

/// JSON shape of an order line in responses.
#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    pub order: OrderId,
    pub menuitem: MenuItemId,
    pub quantity: i32,
    pub price: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            order: line.order_id,
            menuitem: line.menu_item_id,
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// JSON shape of an order in responses, lines embedded.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user: UserId,
    pub delivery_crew: Option<UserId>,
    pub status: bool,
    pub date: NaiveDate,
    pub total: Decimal,
    pub order_item: Vec<OrderLineResponse>,
}

impl OrderResponse {
    fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        Self {
            id: order.id,
            user: order.user_id,
            delivery_crew: order.delivery_crew_id,
            status: order.status,
            date: order.order_date,
            total: order.total,
            order_item: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// PUT request body: full replace of assignment and status.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub delivery_crew: Option<UserId>,
    pub status: bool,
}

/// PATCH request body: status only.
#[derive(Debug, Deserialize)]
pub struct PatchOrderRequest {
    pub status: bool,
}

/// GET /orders - role-scoped listing.
///
/// Managers see every order, delivery crew the orders assigned to them,
/// everyone else their own.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> Result<Json<Vec<OrderResponse>>> {
    let repo = OrderRepository::new(state.pool());

    let orders = match order_scope(&actor) {
        OrderScope::All => repo.list_all().await?,
        OrderScope::AssignedTo(crew) => repo.list_assigned_to(crew).await?,
        OrderScope::OwnedBy(user) => repo.list_owned_by(user).await?,
    };

    let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut lines_by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
    for line in repo.lines_for_orders(&ids).await? {
        lines_by_order.entry(line.order_id).or_default().push(line);
    }

    Ok(Json(
        orders
            .into_iter()
            .map(|order| {
                let lines = lines_by_order.remove(&order.id).unwrap_or_default();
                OrderResponse::new(order, lines)
            })
            .collect(),
    ))
}

/// POST /orders - place an order from the caller's cart.
///
/// 400 when the cart is empty. On success the cart is drained and the
/// response carries the snapshotted lines.
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    authorize(&actor, Action::PlaceOrder).require()?;

    let placed = OrderRepository::new(state.pool()).place(actor.id).await?;

    let Some((order, lines)) = placed else {
        return Err(AppError::Validation(
            "No items found in the cart.".to_owned(),
        ));
    };

    tracing::info!(order_id = %order.id, user = %actor.username, total = %order.total, "Order placed");

    Ok((StatusCode::CREATED, Json(OrderResponse::new(order, lines))))
}

/// GET /orders/{id} - the order's line items.
///
/// Access follows the listing rule: managers any order, crew their assigned
/// orders, owners their own.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<OrderLineResponse>>> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found.".to_owned()))?;

    if !can_view_order(&actor, &order) {
        return Err(AppError::PermissionDenied);
    }

    let lines = repo.lines_for_order(order.id).await?;

    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

/// PUT /orders/{id} - replace delivery assignment and status (manager).
///
/// `delivery_crew`, when set, must name a member of the Delivery crew group;
/// that rule lives here at the endpoint, not in the storage layer.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>> {
    authorize(&actor, Action::AssignOrder).require()?;

    if let Some(crew_id) = body.delivery_crew {
        let is_crew = GroupRepository::new(state.pool())
            .is_member(crew_id, Role::DeliveryCrew)
            .await?;
        if !is_crew {
            return Err(AppError::Validation(
                "delivery_crew must be a member of the Delivery crew group.".to_owned(),
            ));
        }
    }

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .update_assignment(id, body.delivery_crew, body.status)
        .await
        .map_err(not_found_as_order)?;

    tracing::info!(order_id = %order.id, actor = %actor.username, "Order assignment updated");

    let lines = repo.lines_for_order(order.id).await?;
    Ok(Json(OrderResponse::new(order, lines)))
}

/// PATCH /orders/{id} - flip the delivered flag (assigned crew member).
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<PatchOrderRequest>,
) -> Result<Json<OrderResponse>> {
    authorize(&actor, Action::MarkOrderDelivered).require()?;

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found.".to_owned()))?;

    // Only the crew member the order is assigned to may update it
    if order.delivery_crew_id != Some(actor.id) {
        return Err(AppError::PermissionDenied);
    }

    let order = repo
        .update_status(order.id, body.status)
        .await
        .map_err(not_found_as_order)?;

    tracing::info!(order_id = %order.id, status = order.status, actor = %actor.username, "Order status updated");

    let lines = repo.lines_for_order(order.id).await?;
    Ok(Json(OrderResponse::new(order, lines)))
}

/// DELETE /orders/{id} - hard delete (manager).
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    authorize(&actor, Action::DeleteOrder).require()?;

    let deleted = OrderRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Order not found".to_owned()));
    }

    tracing::info!(order_id = %id, actor = %actor.username, "Order deleted");

    Ok(StatusCode::OK)
}

/// Give repository NotFound a resource-specific message.
fn not_found_as_order(err: crate::db::RepositoryError) -> AppError {
    match err {
        crate::db::RepositoryError::NotFound => AppError::NotFound("Order not found.".to_owned()),
        other => other.into(),
    }
}
