mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use user_service::types::Environment;

async fn create_user(setup: &TestSetup, username: &str, transaction_id: &str) -> StatusCode {
    setup
        .send_json("POST", "/users", &json!({ "username": username }), transaction_id)
        .await
        .status()
}

async fn get_user(setup: &TestSetup, username: &str) -> serde_json::Value {
    let response = setup.send_get_request(&format!("/users/{username}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response).await
}

#[tokio::test]
async fn test_index_reports_server_on() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "The server is ON!!!" })
    );
}

#[tokio::test]
async fn test_health_reports_version() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stage"], "development");
    assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_then_retrieve_user() {
    let setup = TestSetup::new();

    let response = setup
        .send_json("POST", "/users", &json!({ "username": "alice" }), "tx-create")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "User created successfully!!!" })
    );

    let body = get_user(&setup, "alice").await;
    assert_eq!(body["message"], "User retrieved successfully!!!");

    let user = &body["user"];
    assert_eq!(user["username"], "alice");
    assert_eq!(user["level"], 1);
    assert_eq!(user["experience"], 0);
    assert_eq!(user["coins"], 0);
    assert_eq!(user["gems"], 0);
    assert_eq!(user["ip"], "203.0.113.7");
    assert_eq!(user["transactionId"], "tx-create");
    assert_eq!(user["createdAt"], TEST_CREATED_ON);
    assert!(user["registeredIn"].is_string());
    assert!(user.get("updatedIn").is_none());
}

#[tokio::test]
async fn test_create_duplicate_user_fails_without_changing_record() {
    let setup = TestSetup::new();
    assert_eq!(create_user(&setup, "alice", "tx-1").await, StatusCode::OK);
    let before = get_user(&setup, "alice").await;

    let response = setup
        .send_json("POST", "/users", &json!({ "username": "alice" }), "tx-2")
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "Error!!!" })
    );
    assert_eq!(get_user(&setup, "alice").await, before);
}

#[tokio::test]
async fn test_update_user_overwrites_stats() {
    let setup = TestSetup::new();
    assert_eq!(create_user(&setup, "alice", "tx-create").await, StatusCode::OK);

    let response = setup
        .send_json(
            "PUT",
            "/users",
            &json!({
                "username": "alice",
                "level": 5,
                "experience": 1200,
                "coins": 300,
                "gems": 12,
                "updatedIn": "ignored"
            }),
            "tx-update",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    // Same message as create
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "User created successfully!!!" })
    );

    let user = get_user(&setup, "alice").await["user"].clone();
    assert_eq!(user["level"], 5);
    assert_eq!(user["experience"], 1200);
    assert_eq!(user["coins"], 300);
    assert_eq!(user["gems"], 12);
    assert_eq!(user["transactionId"], "tx-update");
    assert_eq!(user["createdAt"], TEST_CREATED_ON);
    assert!(user["registeredIn"].is_string());
    assert!(user["updatedIn"].is_string());
    assert_ne!(user["updatedIn"], "ignored");
}

#[tokio::test]
async fn test_update_unknown_user_upserts() {
    let setup = TestSetup::new();

    let response = setup
        .send_json(
            "PUT",
            "/users",
            &json!({ "username": "bob", "level": 2, "experience": 0, "coins": 1, "gems": 0 }),
            "tx-update",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_user(&setup, "bob").await["user"]["level"], 2);
}

#[tokio::test]
async fn test_update_with_missing_field_fails() {
    let setup = TestSetup::new();
    assert_eq!(create_user(&setup, "alice", "tx-create").await, StatusCode::OK);

    let response = setup
        .send_json(
            "PUT",
            "/users",
            &json!({ "username": "alice", "level": 2, "experience": 10, "coins": 1 }),
            "tx-update",
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(get_user(&setup, "alice").await["user"]["level"], 1);
}

#[tokio::test]
async fn test_retrieve_unknown_user_omits_user() {
    let setup = TestSetup::new();

    let body = get_user(&setup, "ghost").await;

    assert_eq!(body, json!({ "message": "User retrieved successfully!!!" }));
}

#[tokio::test]
async fn test_invalid_create_payloads_fail() {
    let setup = TestSetup::new();

    for payload in [json!({}), json!({ "username": "" }), json!({ "username": 42 })] {
        let response = setup.send_json("POST", "/users", &payload, "tx").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            parse_response_body(response).await,
            json!({ "message": "Error!!!" })
        );
    }
    assert_eq!(setup.store.item_count(TEST_USERS_TABLE), 0);
}

#[tokio::test]
async fn test_create_accepts_body_without_content_type() {
    let setup = TestSetup::new();
    let request = Request::builder()
        .uri("/users")
        .method("POST")
        .body(Body::from(json!({ "username": "carol" }).to_string()))
        .unwrap();

    let response = setup.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let user = get_user(&setup, "carol").await["user"].clone();
    assert!(user.get("ip").is_none());
    // Generated transaction id
    assert_eq!(user["transactionId"].as_str().map(str::len), Some(36));
}

#[tokio::test]
async fn test_store_failure_returns_generic_error() {
    let setup = TestSetup::new();
    setup.store.set_unavailable(true);

    assert_eq!(
        create_user(&setup, "alice", "tx").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let response = setup.send_get_request("/users/alice").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "Error!!!" })
    );
}

#[tokio::test]
async fn test_concurrent_creates_admit_one() {
    let setup = Arc::new(TestSetup::new());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let setup = setup.clone();
            tokio::spawn(async move { create_user(&setup, "racer", &format!("tx-{i}")).await })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(created, 1);
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::OK || *s == StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(setup.store.item_count(TEST_USERS_TABLE), 1);
}

#[tokio::test]
async fn test_docs_hidden_in_production() {
    let setup = TestSetup::with_environment(Environment::Production);
    let response = setup.send_get_request("/openapi.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let setup = TestSetup::new();
    let response = setup.send_get_request("/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["paths"]["/users"].is_object());
}
