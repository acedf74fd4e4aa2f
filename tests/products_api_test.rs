// Integration tests for the product catalog endpoints

use axum::http::StatusCode;
use catalog_backend_core::{
    models::Role,
    repositories::{LookupKey, ProductRepository},
};
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{product_body, setup_test_app};

#[tokio::test]
#[serial]
async fn test_instructor_creates_product() {
    let app = setup_test_app();
    let instructor = app.seed_user(Role::Instructor).await;

    let response = app
        .post("/api/products")
        .bearer(&instructor.token)
        .json(&product_body("Async Rust in Practice"))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    let product = &body["product"];
    assert_eq!(product["title"], "Async Rust in Practice");
    assert_eq!(product["type"], "Course");
    assert_eq!(product["version"], 1);
    assert_eq!(product["createdBy"], instructor.user.id.to_string());
    assert!(product["slug"]
        .as_str()
        .unwrap()
        .starts_with("async-rust-in-practice-"));
    assert!(body["message"].is_string());
}

#[tokio::test]
#[serial]
async fn test_create_requires_author_role() {
    let app = setup_test_app();
    let user = app.seed_user(Role::User).await;

    let anonymous = app
        .post("/api/products")
        .json(&product_body("Nobody"))
        .send()
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forbidden = app
        .post("/api/products")
        .bearer(&user.token)
        .json(&product_body("Plain user"))
        .send()
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_create_reports_every_missing_field() {
    let app = setup_test_app();
    let admin = app.seed_user(Role::Admin).await;

    let response = app
        .post("/api/products")
        .bearer(&admin.token)
        .json(&json!({ "title": "Only a title" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "Validation failed");
    let details: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        details,
        vec![
            "description is required",
            "type is required",
            "price is required",
            "category is required",
            "instructor.name is required",
        ]
    );
}

#[tokio::test]
#[serial]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app();
    let admin = app.seed_user(Role::Admin).await;

    let response = app
        .post("/api/products")
        .bearer(&admin.token)
        .raw_json("{\"title\": ")
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
#[serial]
async fn test_anonymous_listing_only_shows_published() {
    let app = setup_test_app();
    let instructor = app.seed_user(Role::Instructor).await;
    app.create_product(&instructor, json!({ "title": "Published course" }))
        .await;
    app.create_product(
        &instructor,
        json!({ "title": "Draft course", "status": "draft" }),
    )
    .await;

    let response = app.get("/api/products?status=draft").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;

    let titles: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Published course"]);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["filters"]["status"], "published");

    // The owner sees their own draft as well
    let owner_view: Value = app
        .get("/api/products")
        .bearer(&instructor.token)
        .send()
        .await
        .json()
        .await;
    assert_eq!(owner_view["pagination"]["total"], 2);
}

#[tokio::test]
#[serial]
async fn test_listing_rejects_unknown_type() {
    let app = setup_test_app();

    let response = app.get("/api/products?type=invalidtype").send().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "Invalid product type: invalidtype");
}

#[tokio::test]
#[serial]
async fn test_get_by_slug_requires_authentication() {
    let app = setup_test_app();
    let instructor = app.seed_user(Role::Instructor).await;
    let reader = app.seed_user(Role::User).await;
    let product = app.create_product(&instructor, json!({})).await;
    let uri = format!("/api/products/{}", product["slug"].as_str().unwrap());

    let anonymous = app.get(&uri).send().await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let response = app.get(&uri).bearer(&reader.token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["product"]["id"], product["id"]);
}

#[tokio::test]
#[serial]
async fn test_draft_is_hidden_from_other_users() {
    let app = setup_test_app();
    let instructor = app.seed_user(Role::Instructor).await;
    let reader = app.seed_user(Role::User).await;
    let draft = app
        .create_product(&instructor, json!({ "status": "draft" }))
        .await;
    let uri = format!("/api/products/{}", draft["id"].as_str().unwrap());

    let response = app.get(&uri).bearer(&reader.token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let owner = app.get(&uri).bearer(&instructor.token).send().await;
    assert_eq!(owner.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_only_owner_or_admin_can_update() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let other = app.seed_user(Role::Instructor).await;
    let admin = app.seed_user(Role::Admin).await;
    let product = app.create_product(&owner, json!({})).await;
    let uri = format!("/api/products/{}", product["id"].as_str().unwrap());

    let forbidden = app
        .put(&uri)
        .bearer(&other.token)
        .json(&json!({ "price": 10.0 }))
        .send()
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let response = app
        .put(&uri)
        .bearer(&admin.token)
        .json(&json!({ "price": 10.0, "featured": true }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["product"]["price"], 10.0);
    assert_eq!(body["product"]["featured"], true);
    assert_eq!(body["product"]["version"], 2);
}

#[tokio::test]
#[serial]
async fn test_empty_update_is_rejected() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;

    let response = app
        .put(&format!("/api/products/{}", product["id"].as_str().unwrap()))
        .bearer(&owner.token)
        .json(&json!({}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "No fields to update");
}

#[tokio::test]
#[serial]
async fn test_delete_returns_deleted_id() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;
    let uri = format!("/api/products/{}", product["id"].as_str().unwrap());

    let response = app.delete(&uri).bearer(&owner.token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["deletedId"], product["id"]);

    let gone = app.get(&uri).bearer(&owner.token).send().await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_delete_refuses_products_with_enrollments() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    let product = app.create_product(&owner, json!({})).await;
    let id = Uuid::parse_str(product["id"].as_str().unwrap()).unwrap();

    let mut stored = app
        .state
        .store
        .products
        .find(&LookupKey::Id(id))
        .await
        .unwrap()
        .unwrap();
    let version = stored.version;
    stored.enrollments = 2;
    app.state
        .store
        .products
        .update(stored, version)
        .await
        .unwrap();

    let uri = format!("/api/products/{}", id);
    let refused = app.delete(&uri).bearer(&owner.token).send().await;
    assert_eq!(refused.status(), StatusCode::BAD_REQUEST);
    let body: Value = refused.json().await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("2 active enrollments"));

    let still_there = app.get(&uri).bearer(&owner.token).send().await;
    assert_eq!(still_there.status(), StatusCode::OK);
    let body: Value = still_there.json().await;
    assert_eq!(body["product"]["id"], product["id"]);
    assert_eq!(body["product"]["title"], product["title"]);
}

#[tokio::test]
#[serial]
async fn test_search_treats_wildcards_literally() {
    let app = setup_test_app();
    let owner = app.seed_user(Role::Instructor).await;
    app.create_product(&owner, json!({ "title": "Async Rust" })).await;
    app.create_product(&owner, json!({ "title": "100% Rust" })).await;

    let body: Value = app
        .get("/api/products?search=%25")
        .send()
        .await
        .json()
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["products"][0]["title"], "100% Rust");

    let body: Value = app
        .get("/api/products?search=_")
        .send()
        .await
        .json()
        .await;
    assert_eq!(body["pagination"]["total"], 0);
}
