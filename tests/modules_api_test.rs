// Integration tests for GET/PUT /api/products/{id}/modules

use axum::http::StatusCode;
use catalog_backend_core::models::Role;
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::setup_test_app;

fn two_modules() -> Value {
    json!([
        {
            "title": "Ownership",
            "description": "Moves, borrows and lifetimes",
            "duration": "2 hours",
            "order": 7,
            "lessons": [
                { "title": "Moves" },
                { "title": "Borrowing", "type": "video", "videoUrl": "https://videos.example.com/b" }
            ]
        },
        {
            "id": "mod-async",
            "title": "Async",
            "description": "Futures and executors",
            "duration": 90
        }
    ])
}

#[tokio::test]
#[serial]
async fn test_replace_modules_normalizes_and_bumps_version() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;
    let uri = format!("/api/products/{}/modules", product["id"].as_str().unwrap());

    let response = app
        .put(&uri)
        .bearer(&owner.token)
        .json(&json!({ "modules": two_modules(), "version": 1 }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["message"], "2 modules updated successfully");
    assert_eq!(body["version"], 2);

    let modules = body["modules"].as_array().unwrap();
    assert_eq!(modules[0]["order"], 0);
    assert_eq!(modules[1]["order"], 1);
    assert_eq!(modules[1]["id"], "mod-async");
    assert_eq!(modules[1]["duration"], "90");
    assert!(!modules[0]["id"].as_str().unwrap().is_empty());

    let lessons = modules[0]["lessons"].as_array().unwrap();
    assert_eq!(lessons[0]["locked"], false);
    assert_eq!(lessons[1]["locked"], true);
    assert_eq!(lessons[0]["type"], "reading");

    // Published product: anyone can read the curriculum
    let read: Value = app.get(&uri).send().await.json().await;
    assert_eq!(read["modules"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_stale_version_conflicts() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;
    let uri = format!("/api/products/{}/modules", product["id"].as_str().unwrap());

    let first = app
        .put(&uri)
        .bearer(&owner.token)
        .json(&json!({ "modules": two_modules(), "version": 1 }))
        .send()
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let stale = app
        .put(&uri)
        .bearer(&owner.token)
        .json(&json!({ "modules": [], "version": 1 }))
        .send()
        .await;
    assert_eq!(stale.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_empty_array_clears_modules() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app
        .create_product(&owner, json!({ "modules": two_modules() }))
        .await;
    let uri = format!("/api/products/{}/modules", product["id"].as_str().unwrap());

    let response = app
        .put(&uri)
        .bearer(&owner.token)
        .json(&json!({ "modules": [] }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["message"], "All modules cleared");
    assert_eq!(body["modules"], json!([]));
}

#[tokio::test]
#[serial]
async fn test_each_missing_module_field_is_reported() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;

    let response = app
        .put(&format!("/api/products/{}/modules", product["id"].as_str().unwrap()))
        .bearer(&owner.token)
        .json(&json!({ "modules": [{ "title": "Only a title" }] }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(
        body["details"],
        json!([
            "Module 1: description is required",
            "Module 1: duration is required"
        ])
    );
}

#[tokio::test]
#[serial]
async fn test_modules_must_be_an_array() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;

    let response = app
        .put(&format!("/api/products/{}/modules", product["id"].as_str().unwrap()))
        .bearer(&owner.token)
        .json(&json!({ "modules": "not an array" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "Modules must be an array");
}

#[tokio::test]
#[serial]
async fn test_authorization_order() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let other = app.seed_user(Role::Instructor).await;
    let student = app.seed_user(Role::User).await;
    let product = app.create_product(&owner, json!({})).await;
    let uri = format!("/api/products/{}/modules", product["id"].as_str().unwrap());
    let body = json!({ "modules": [] });

    let anonymous = app.put(&uri).json(&body).send().await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let bad_token = app.put(&uri).bearer("not-a-jwt").json(&body).send().await;
    assert_eq!(bad_token.status(), StatusCode::UNAUTHORIZED);
    let error: Value = bad_token.json().await;
    assert_eq!(error["error"], "Invalid token");

    let wrong_role = app.put(&uri).bearer(&student.token).json(&body).send().await;
    assert_eq!(wrong_role.status(), StatusCode::FORBIDDEN);

    let not_owner = app.put(&uri).bearer(&other.token).json(&body).send().await;
    assert_eq!(not_owner.status(), StatusCode::FORBIDDEN);

    let bad_id = app
        .put("/api/products/not-a-uuid/modules")
        .bearer(&owner.token)
        .json(&body)
        .send()
        .await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

    let missing = app
        .put(&format!("/api/products/{}/modules", Uuid::new_v4()))
        .bearer(&owner.token)
        .json(&body)
        .send()
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_draft_curriculum_is_gated() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let student = app.seed_user(Role::User).await;
    let draft = app
        .create_product(&owner, json!({ "status": "draft" }))
        .await;
    let uri = format!("/api/products/{}/modules", draft["id"].as_str().unwrap());

    assert_eq!(app.get(&uri).send().await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get(&uri).bearer(&student.token).send().await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get(&uri).bearer(&owner.token).send().await.status(),
        StatusCode::OK
    );
}
