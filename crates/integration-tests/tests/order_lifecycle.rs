//! Integration tests for the order lifecycle: cart-to-order transition,
//! role-scoped reads, assignment, delivery and deletion.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (cargo run -p sage-bistro-cli -- migrate)
//! - The API running (cargo run -p sage-bistro-api)
//!
//! Run with: cargo test -p sage-bistro-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use sage_bistro_core::Role;
use sage_bistro_integration_tests::TestContext;

// ============================================================================
// Placement
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_place_order_totals_and_drains_cart() {
    let ctx = TestContext::new().await;
    let alice = TestContext::client();
    ctx.register_and_login(&alice, &TestContext::unique_username("alice"))
        .await;

    // alice adds menu item (unit_price=9.50) x2: line price must be 19.00
    let item = ctx.seed_menu_item("9.50").await;
    let line = ctx.add_to_cart(&alice, item, 2, "9.50").await;
    assert_eq!(line["price"], "19.00");

    // POST /orders -> Order{total=19.00, status=false}
    let resp = alice
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(order["total"], "19.00");
    assert_eq!(order["status"], false);
    assert_eq!(order["order_item"].as_array().map(Vec::len), Some(1));
    assert_eq!(order["order_item"][0]["menuitem"], item);
    assert_eq!(order["order_item"][0]["quantity"], 2);
    assert_eq!(order["order_item"][0]["price"], "19.00");

    // cart is now empty
    let resp = alice
        .get(format!("{}/cart/menu-items", ctx.base_url))
        .send()
        .await
        .expect("Failed to list cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_place_order_multiple_lines_sums_prices() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    ctx.register_and_login(&client, &TestContext::unique_username("buyer"))
        .await;

    let first = ctx.seed_menu_item("4.25").await;
    let second = ctx.seed_menu_item("0.99").await;
    ctx.add_to_cart(&client, first, 1, "4.25").await;
    ctx.add_to_cart(&client, second, 3, "0.99").await;

    let resp = client
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");

    // 4.25 + 2.97
    assert_eq!(order["total"], "7.22");
    assert_eq!(order["order_item"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_place_order_with_empty_cart_is_400() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    ctx.register_and_login(&client, &TestContext::unique_username("empty"))
        .await;

    let resp = client
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to post order");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // and no order was created for this brand-new user
    let resp = client
        .get(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to list orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert_eq!(orders.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_orders_require_authentication() {
    let ctx = TestContext::new().await;
    let anonymous = TestContext::client();

    let resp = anonymous
        .get(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = anonymous
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to post order");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Role-scoped reads
// ============================================================================

/// For the same underlying order set, three different actors see three
/// different result sets: all / assigned / own.
#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_order_list_visibility_by_role() {
    let ctx = TestContext::new().await;

    let customer = TestContext::client();
    let customer_id = ctx
        .register_and_login(&customer, &TestContext::unique_username("cust"))
        .await;

    let crew = TestContext::client();
    let crew_id = ctx
        .register_and_login(&crew, &TestContext::unique_username("crew"))
        .await;
    ctx.promote(crew_id, Role::DeliveryCrew).await;

    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    // the customer places an order
    let item = ctx.seed_menu_item("5.00").await;
    ctx.add_to_cart(&customer, item, 1, "5.00").await;
    let resp = customer
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to place order");
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["id"].as_i64().expect("order id");

    // the manager sees it
    let resp = manager
        .get(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("manager list failed");
    let seen: Value = resp.json().await.expect("parse");
    assert!(
        seen.as_array()
            .expect("array")
            .iter()
            .any(|o| o["id"] == order_id),
        "manager must see every order"
    );

    // the crew member does not see it while unassigned
    let resp = crew
        .get(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("crew list failed");
    let seen: Value = resp.json().await.expect("parse");
    assert!(
        seen.as_array()
            .expect("array")
            .iter()
            .all(|o| o["id"] != order_id),
        "unassigned order must be invisible to crew"
    );

    // the customer sees exactly their own
    let resp = customer
        .get(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("customer list failed");
    let seen: Value = resp.json().await.expect("parse");
    assert!(
        seen.as_array()
            .expect("array")
            .iter()
            .all(|o| o["user"] == customer_id),
        "customer must only see own orders"
    );

    // after assignment the crew member sees it
    let resp = manager
        .put(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "delivery_crew": crew_id, "status": false }))
        .send()
        .await
        .expect("assign failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = crew
        .get(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("crew list failed");
    let seen: Value = resp.json().await.expect("parse");
    assert!(
        seen.as_array()
            .expect("array")
            .iter()
            .any(|o| o["id"] == order_id),
        "assigned order must be visible to its crew member"
    );
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_order_detail_is_scoped_by_order_access() {
    let ctx = TestContext::new().await;

    let owner = TestContext::client();
    ctx.register_and_login(&owner, &TestContext::unique_username("owner"))
        .await;
    let stranger = TestContext::client();
    ctx.register_and_login(&stranger, &TestContext::unique_username("stranger"))
        .await;

    let item = ctx.seed_menu_item("3.00").await;
    ctx.add_to_cart(&owner, item, 2, "3.00").await;
    let resp = owner
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("Failed to place order");
    let order: Value = resp.json().await.expect("parse");
    let order_id = order["id"].as_i64().expect("order id");

    // the owner reads the line items
    let resp = owner
        .get(format!("{}/orders/{order_id}", ctx.base_url))
        .send()
        .await
        .expect("owner detail failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let lines: Value = resp.json().await.expect("parse");
    assert_eq!(lines.as_array().map(Vec::len), Some(1));
    assert_eq!(lines[0]["price"], "6.00");

    // another customer is denied
    let resp = stranger
        .get(format!("{}/orders/{order_id}", ctx.base_url))
        .send()
        .await
        .expect("stranger detail failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // an unknown order is 404
    let resp = owner
        .get(format!("{}/orders/999999999", ctx.base_url))
        .send()
        .await
        .expect("missing detail failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Assignment, delivery, deletion
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_assignment_requires_delivery_crew_membership() {
    let ctx = TestContext::new().await;

    let customer = TestContext::client();
    ctx.register_and_login(&customer, &TestContext::unique_username("cust"))
        .await;
    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let item = ctx.seed_menu_item("8.00").await;
    ctx.add_to_cart(&customer, item, 1, "8.00").await;
    let resp = customer
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("place failed");
    let order: Value = resp.json().await.expect("parse");
    let order_id = order["id"].as_i64().expect("order id");

    // assigning a non-crew user is a validation error
    let outsider = TestContext::client();
    let outsider_id = ctx
        .register_and_login(&outsider, &TestContext::unique_username("nobody"))
        .await;
    let resp = manager
        .put(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "delivery_crew": outsider_id, "status": false }))
        .send()
        .await
        .expect("assign failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // non-managers cannot assign at all
    let resp = customer
        .put(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "delivery_crew": outsider_id, "status": false }))
        .send()
        .await
        .expect("assign failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // unknown order id is 404 for a manager
    let resp = manager
        .put(format!("{}/orders/999999999", ctx.base_url))
        .json(&json!({ "delivery_crew": Value::Null, "status": false }))
        .send()
        .await
        .expect("assign failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_assigned_crew_marks_delivered() {
    let ctx = TestContext::new().await;

    let customer = TestContext::client();
    ctx.register_and_login(&customer, &TestContext::unique_username("cust"))
        .await;
    let crew = TestContext::client();
    let crew_id = ctx
        .register_and_login(&crew, &TestContext::unique_username("crew"))
        .await;
    ctx.promote(crew_id, Role::DeliveryCrew).await;
    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let item = ctx.seed_menu_item("12.00").await;
    ctx.add_to_cart(&customer, item, 1, "12.00").await;
    let resp = customer
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("place failed");
    let order: Value = resp.json().await.expect("parse");
    let order_id = order["id"].as_i64().expect("order id");

    // the customer cannot PATCH (wrong role)
    let resp = customer
        .patch(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "status": true }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // the crew member cannot PATCH before assignment
    let resp = crew
        .patch(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "status": true }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // assign, then the crew member delivers
    let resp = manager
        .put(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "delivery_crew": crew_id, "status": false }))
        .send()
        .await
        .expect("assign failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = crew
        .patch(format!("{}/orders/{order_id}", ctx.base_url))
        .json(&json!({ "status": true }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("parse");
    assert_eq!(updated["status"], true);
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_delete_order_is_manager_only() {
    let ctx = TestContext::new().await;

    let customer = TestContext::client();
    ctx.register_and_login(&customer, &TestContext::unique_username("cust"))
        .await;
    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let item = ctx.seed_menu_item("6.50").await;
    ctx.add_to_cart(&customer, item, 1, "6.50").await;
    let resp = customer
        .post(format!("{}/orders", ctx.base_url))
        .send()
        .await
        .expect("place failed");
    let order: Value = resp.json().await.expect("parse");
    let order_id = order["id"].as_i64().expect("order id");

    // the owner cannot delete their own order
    let resp = customer
        .delete(format!("{}/orders/{order_id}", ctx.base_url))
        .send()
        .await
        .expect("delete failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // the manager can
    let resp = manager
        .delete(format!("{}/orders/{order_id}", ctx.base_url))
        .send()
        .await
        .expect("delete failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // and a second delete is 404
    let resp = manager
        .delete(format!("{}/orders/{order_id}", ctx.base_url))
        .send()
        .await
        .expect("delete failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
