//! Integration tests for the cart and the catalog surface.
//!
//! These tests require a migrated database and a running API; see the crate
//! docs for the startup commands.

use reqwest::StatusCode;
use serde_json::{Value, json};

use sage_bistro_core::Role;
use sage_bistro_integration_tests::TestContext;

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_cart_price_is_computed_server_side() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    ctx.register_and_login(&client, &TestContext::unique_username("cart"))
        .await;

    let item = ctx.seed_menu_item("2.40").await;
    let line = ctx.add_to_cart(&client, item, 3, "2.40").await;

    assert_eq!(line["quantity"], 3);
    assert_eq!(line["unit_price"], "2.40");
    assert_eq!(line["price"], "7.20");
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_cart_is_scoped_to_the_caller() {
    let ctx = TestContext::new().await;

    let first = TestContext::client();
    ctx.register_and_login(&first, &TestContext::unique_username("first"))
        .await;
    let second = TestContext::client();
    ctx.register_and_login(&second, &TestContext::unique_username("second"))
        .await;

    let item = ctx.seed_menu_item("1.00").await;
    ctx.add_to_cart(&first, item, 1, "1.00").await;

    // the other user's cart stays empty
    let resp = second
        .get(format!("{}/cart/menu-items", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    let cart: Value = resp.json().await.expect("parse");
    assert_eq!(cart.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_cart_duplicate_line_is_400_and_clear_answers_ok() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    ctx.register_and_login(&client, &TestContext::unique_username("dup"))
        .await;

    let item = ctx.seed_menu_item("5.00").await;
    ctx.add_to_cart(&client, item, 1, "5.00").await;

    // one row per (user, menuitem): a second add is rejected
    let resp = client
        .post(format!("{}/cart/menu-items", ctx.base_url))
        .json(&json!({ "menuitem": item, "quantity": 2, "unit_price": "5.00" }))
        .send()
        .await
        .expect("add failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // zero quantity is rejected
    let other = ctx.seed_menu_item("5.00").await;
    let resp = client
        .post(format!("{}/cart/menu-items", ctx.base_url))
        .json(&json!({ "menuitem": other, "quantity": 0, "unit_price": "5.00" }))
        .send()
        .await
        .expect("add failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // clear answers "ok" and empties the cart
    let resp = client
        .delete(format!("{}/cart/menu-items", ctx.base_url))
        .send()
        .await
        .expect("clear failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body, json!("ok"));

    let resp = client
        .get(format!("{}/cart/menu-items", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    let cart: Value = resp.json().await.expect("parse");
    assert_eq!(cart.as_array().map(Vec::len), Some(0));
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_menu_item_mutation_is_manager_only() {
    let ctx = TestContext::new().await;

    let customer = TestContext::client();
    ctx.register_and_login(&customer, &TestContext::unique_username("cust"))
        .await;
    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    // find a category id to attach to
    let item = ctx.seed_menu_item("4.00").await;
    let resp = customer
        .get(format!("{}/menu-items/{item}", ctx.base_url))
        .send()
        .await
        .expect("get failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let existing: Value = resp.json().await.expect("parse");
    let category_id = existing["category"]["id"].as_i64().expect("category id");

    let payload = json!({
        "title": "Citrus tart",
        "price": "6.75",
        "featured": true,
        "inventory": 5,
        "category_id": category_id,
    });

    // non-manager create: 403
    let resp = customer
        .post(format!("{}/menu-items", ctx.base_url))
        .json(&payload)
        .send()
        .await
        .expect("create failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // manager create: 201
    let resp = manager
        .post(format!("{}/menu-items", ctx.base_url))
        .json(&payload)
        .send()
        .await
        .expect("create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("parse");
    assert_eq!(created["price"], "6.75");
    let created_id = created["id"].as_i64().expect("id");

    // manager delete: 204, then the item is gone
    let resp = manager
        .delete(format!("{}/menu-items/{created_id}", ctx.base_url))
        .send()
        .await
        .expect("delete failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = customer
        .get(format!("{}/menu-items/{created_id}", ctx.base_url))
        .send()
        .await
        .expect("get failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_menu_item_listing_filters_and_orders() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    ctx.register_and_login(&client, &TestContext::unique_username("list"))
        .await;

    ctx.seed_menu_item("9.10").await;
    ctx.seed_menu_item("1.10").await;

    // filter by the fixture category
    let resp = client
        .get(format!(
            "{}/menu-items?category=Integration&ordering=price",
            ctx.base_url
        ))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let items: Value = resp.json().await.expect("parse");
    let items = items.as_array().expect("array");
    assert!(items.len() >= 2);
    assert!(
        items
            .iter()
            .all(|i| i["category"]["title"] == "Integration"),
    );

    // prices come back ascending
    let prices: Vec<String> = items
        .iter()
        .map(|i| i["price"].as_str().expect("price").to_owned())
        .collect();
    let mut sorted = prices.clone();
    sorted.sort_by(|a, b| {
        a.parse::<f64>()
            .expect("price")
            .partial_cmp(&b.parse::<f64>().expect("price"))
            .expect("order")
    });
    assert_eq!(prices, sorted);

    // a bogus ordering key is rejected
    let resp = client
        .get(format!("{}/menu-items?ordering=title", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // unauthenticated read is rejected
    let anonymous = TestContext::client();
    let resp = anonymous
        .get(format!("{}/menu-items", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
