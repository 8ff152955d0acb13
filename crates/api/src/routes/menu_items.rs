//! Catalog route handlers.
//!
//! Reads are open to any authenticated actor; writes are manager-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sage_bistro_core::{CategoryId, MenuItemId};

use crate::authz::{Action, authorize};
use crate::db::menu_items::{MenuItemChanges, NewMenuItem};
use crate::db::{MenuItemRepository, MenuOrdering};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Category, MenuItem};
use crate::state::AppState;

/// JSON shape of a category in responses.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub title: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            slug: category.slug,
        }
    }
}

/// JSON shape of a menu item in responses.
#[derive(Debug, Serialize)]
pub struct MenuItemResponse {
    pub id: MenuItemId,
    pub title: String,
    pub price: Decimal,
    pub featured: bool,
    pub inventory: i32,
    pub category: CategoryResponse,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            price: item.price,
            featured: item.featured,
            inventory: item.inventory,
            category: item.category.into(),
        }
    }
}

/// Query parameters for menu item listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by category title.
    pub category: Option<String>,
    /// Sort key: `price`, `-price`, `inventory`, `-inventory`.
    pub ordering: Option<String>,
}

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub inventory: i32,
    pub category_id: CategoryId,
}

/// Full-replace (PUT) request body.
#[derive(Debug, Deserialize)]
pub struct UpdateMenuItemRequest {
    pub title: String,
    pub price: Decimal,
    pub featured: bool,
    pub inventory: i32,
    pub category_id: CategoryId,
}

/// Partial-update (PATCH) request body.
#[derive(Debug, Deserialize, Default)]
pub struct PatchMenuItemRequest {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub featured: Option<bool>,
    pub inventory: Option<i32>,
    pub category_id: Option<CategoryId>,
}

fn parse_ordering(query: &ListQuery) -> Result<Option<MenuOrdering>> {
    query
        .ordering
        .as_deref()
        .map(|value| {
            MenuOrdering::parse(value)
                .ok_or_else(|| AppError::Validation(format!("Unknown ordering: {value}")))
        })
        .transpose()
}

/// GET /menu-items - list, optionally filtered and ordered.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MenuItemResponse>>> {
    authorize(&actor, Action::ReadMenu).require()?;

    let ordering = parse_ordering(&query)?;
    let items = MenuItemRepository::new(state.pool())
        .list(query.category.as_deref(), ordering)
        .await?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// GET /menu-items/{id} - a single item.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<MenuItemId>,
) -> Result<Json<MenuItemResponse>> {
    authorize(&actor, Action::ReadMenu).require()?;

    let item = MenuItemRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found.".to_owned()))?;

    Ok(Json(item.into()))
}

/// POST /menu-items - create an item (manager).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(body): Json<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItemResponse>)> {
    authorize(&actor, Action::WriteMenu).require()?;

    let item = MenuItemRepository::new(state.pool())
        .create(NewMenuItem {
            title: body.title,
            price: body.price,
            featured: body.featured,
            inventory: body.inventory,
            category_id: body.category_id,
        })
        .await?;

    tracing::info!(item_id = %item.id, actor = %actor.username, "Menu item created");

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /menu-items/{id} - replace an item (manager).
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<MenuItemId>,
    Json(body): Json<UpdateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>> {
    authorize(&actor, Action::WriteMenu).require()?;

    let item = MenuItemRepository::new(state.pool())
        .update(
            id,
            MenuItemChanges {
                title: Some(body.title),
                price: Some(body.price),
                featured: Some(body.featured),
                inventory: Some(body.inventory),
                category_id: Some(body.category_id),
            },
        )
        .await
        .map_err(not_found_as_item)?;

    Ok(Json(item.into()))
}

/// PATCH /menu-items/{id} - partially update an item (manager).
pub async fn partial_update(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<MenuItemId>,
    Json(body): Json<PatchMenuItemRequest>,
) -> Result<Json<MenuItemResponse>> {
    authorize(&actor, Action::WriteMenu).require()?;

    let item = MenuItemRepository::new(state.pool())
        .update(
            id,
            MenuItemChanges {
                title: body.title,
                price: body.price,
                featured: body.featured,
                inventory: body.inventory,
                category_id: body.category_id,
            },
        )
        .await
        .map_err(not_found_as_item)?;

    Ok(Json(item.into()))
}

/// DELETE /menu-items/{id} - delete an item (manager).
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<MenuItemId>,
) -> Result<StatusCode> {
    authorize(&actor, Action::WriteMenu).require()?;

    let deleted = MenuItemRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Menu item not found.".to_owned()));
    }

    tracing::info!(item_id = %id, actor = %actor.username, "Menu item deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Give repository NotFound a resource-specific message.
fn not_found_as_item(err: crate::db::RepositoryError) -> AppError {
    match err {
        crate::db::RepositoryError::NotFound => {
            AppError::NotFound("Menu item not found.".to_owned())
        }
        other => other.into(),
    }
}
