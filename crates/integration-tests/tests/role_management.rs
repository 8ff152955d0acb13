//! Integration tests for role-group management endpoints.
//!
//! These tests require a migrated database and a running API; see the crate
//! docs for the startup commands.

use reqwest::StatusCode;
use serde_json::{Value, json};

use sage_bistro_core::Role;
use sage_bistro_integration_tests::TestContext;

// ============================================================================
// Membership add
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_add_member_and_duplicate_is_400() {
    let ctx = TestContext::new().await;

    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let recruit_name = TestContext::unique_username("recruit");
    let recruit = TestContext::client();
    ctx.register_and_login(&recruit, &recruit_name).await;

    // first add: 201 with a message body
    let resp = manager
        .post(format!("{}/groups/delivery-crew/users", ctx.base_url))
        .json(&json!({ "username": recruit_name }))
        .send()
        .await
        .expect("add failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("parse");
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("added to Delivery crew group"),
    );

    // the member shows up in the listing
    let resp = manager
        .get(format!("{}/groups/delivery-crew/users", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let members: Value = resp.json().await.expect("parse");
    assert!(
        members
            .as_array()
            .expect("array")
            .iter()
            .any(|u| u["username"] == recruit_name.as_str()),
    );

    // adding again never duplicates membership: 400
    let resp = manager
        .post(format!("{}/groups/delivery-crew/users", ctx.base_url))
        .json(&json!({ "username": recruit_name }))
        .send()
        .await
        .expect("add failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_add_member_unknown_username_is_404() {
    let ctx = TestContext::new().await;

    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let resp = manager
        .post(format!("{}/groups/manager/users", ctx.base_url))
        .json(&json!({ "username": TestContext::unique_username("ghost") }))
        .send()
        .await
        .expect("add failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // missing username field is a 400
    let resp = manager
        .post(format!("{}/groups/manager/users", ctx.base_url))
        .json(&json!({}))
        .send()
        .await
        .expect("add failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Membership remove
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_remove_member_and_missing_membership_is_404() {
    let ctx = TestContext::new().await;

    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let crew_name = TestContext::unique_username("crew");
    let crew = TestContext::client();
    let crew_id = ctx.register_and_login(&crew, &crew_name).await;
    ctx.promote(crew_id, Role::DeliveryCrew).await;

    // remove the membership
    let resp = manager
        .delete(format!(
            "{}/groups/delivery-crew/users/{crew_id}",
            ctx.base_url
        ))
        .send()
        .await
        .expect("remove failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("parse");
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("removed from Delivery crew group"),
    );

    // removing again: membership absent -> 404, nothing changed
    let resp = manager
        .delete(format!(
            "{}/groups/delivery-crew/users/{crew_id}",
            ctx.base_url
        ))
        .send()
        .await
        .expect("remove failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // unknown user id -> 404
    let resp = manager
        .delete(format!(
            "{}/groups/delivery-crew/users/999999999",
            ctx.base_url
        ))
        .send()
        .await
        .expect("remove failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_group_endpoints_are_manager_only() {
    let ctx = TestContext::new().await;

    let customer = TestContext::client();
    let customer_name = TestContext::unique_username("cust");
    ctx.register_and_login(&customer, &customer_name).await;

    for role in ["manager", "delivery-crew"] {
        let resp = customer
            .get(format!("{}/groups/{role}/users", ctx.base_url))
            .send()
            .await
            .expect("list failed");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = customer
            .post(format!("{}/groups/{role}/users", ctx.base_url))
            .json(&json!({ "username": customer_name }))
            .send()
            .await
            .expect("add failed");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = customer
            .delete(format!("{}/groups/{role}/users/1", ctx.base_url))
            .send()
            .await
            .expect("remove failed");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    // unauthenticated callers get 401
    let anonymous = TestContext::client();
    let resp = anonymous
        .get(format!("{}/groups/manager/users", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running bistro-api server and database"]
async fn test_unknown_role_segment_is_404() {
    let ctx = TestContext::new().await;

    let manager = TestContext::client();
    let manager_id = ctx
        .register_and_login(&manager, &TestContext::unique_username("mgr"))
        .await;
    ctx.promote(manager_id, Role::Manager).await;

    let resp = manager
        .get(format!("{}/groups/waiters/users", ctx.base_url))
        .send()
        .await
        .expect("list failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
