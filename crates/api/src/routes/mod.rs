//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/register          - Create an account
//! POST /auth/login             - Login (establishes a session)
//! POST /auth/logout            - Logout
//! GET  /auth/me                - Current user
//!
//! # Catalog
//! GET  /menu-items             - List (filter: ?category=, order: ?ordering=)
//! POST /menu-items             - Create (manager)
//! GET  /menu-items/{id}        - Single item
//! PUT  /menu-items/{id}        - Replace (manager)
//! PATCH /menu-items/{id}       - Partial update (manager)
//! DELETE /menu-items/{id}      - Delete (manager)
//!
//! # Role management (manager)
//! GET  /groups/{role}/users    - List members ("manager" | "delivery-crew")
//! POST /groups/{role}/users    - Add member by username
//! DELETE /groups/{role}/users/{id} - Remove member by user id
//!
//! # Cart
//! GET  /cart/menu-items        - Caller's cart lines
//! POST /cart/menu-items        - Add a line (price computed server-side)
//! DELETE /cart/menu-items      - Clear the caller's cart
//!
//! # Orders
//! GET  /orders                 - Role-scoped listing
//! POST /orders                 - Place an order from the caller's cart
//! GET  /orders/{id}            - The order's line items
//! PUT  /orders/{id}            - Assign crew / set status (manager)
//! PATCH /orders/{id}           - Mark delivered (assigned crew)
//! DELETE /orders/{id}          - Delete (manager)
//! ```

pub mod auth;
pub mod cart;
pub mod groups;
pub mod menu_items;
pub mod orders;

use axum::{
    Router,
    routing::{delete, get, post},
};
use serde::Serialize;

use sage_bistro_core::UserId;

use crate::models::{CurrentUser, User};
use crate::state::AppState;

/// JSON shape of a user in responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username.into_inner(),
            email: user.email,
        }
    }
}

impl From<CurrentUser> for UserResponse {
    fn from(actor: CurrentUser) -> Self {
        Self {
            id: actor.id,
            username: actor.username.into_inner(),
            email: actor.email,
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the menu item routes router.
pub fn menu_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu_items::list).post(menu_items::create))
        .route(
            "/{id}",
            get(menu_items::get_by_id)
                .put(menu_items::update)
                .patch(menu_items::partial_update)
                .delete(menu_items::delete),
        )
}

/// Create the role management routes router.
pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/{role}/users", get(groups::list).post(groups::add))
        .route("/{role}/users/{id}", delete(groups::remove))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/menu-items",
        get(cart::list).post(cart::add).delete(cart::clear),
    )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::place))
        .route(
            "/{id}",
            get(orders::get_by_id)
                .put(orders::update)
                .patch(orders::update_status)
                .delete(orders::delete),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/menu-items", menu_item_routes())
        .nest("/groups", group_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
}
