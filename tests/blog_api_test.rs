// Integration tests for the blog endpoints

use axum::http::StatusCode;
use catalog_backend_core::models::Role;
use serde_json::{json, Value};
use serial_test::serial;

mod common;
use common::{setup_test_app, TestApp, TestUser};

async fn create_post(app: &TestApp, author: &TestUser, body: Value) -> Value {
    let response = app
        .post("/api/blog")
        .bearer(&author.token)
        .json(&body)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    response.json::<Value>().await["post"].clone()
}

#[tokio::test]
#[serial]
async fn test_create_fills_defaults() {
    let app = setup_test_app();
    let author = app.seed_user(Role::Instructor).await;
    let content = "word ".repeat(450);

    let post = create_post(
        &app,
        &author,
        json!({ "title": "Why Rust", "content": content, "status": "published" }),
    )
    .await;

    assert_eq!(post["readTime"], "3 min read");
    assert_eq!(post["category"], "General");
    assert_eq!(post["author"]["name"], "Test instructor");
    assert_eq!(post["views"], 0);
    assert!(post["publishedAt"].is_string());
    assert!(post["slug"].as_str().unwrap().starts_with("why-rust-"));
}

#[tokio::test]
#[serial]
async fn test_create_requires_title_and_content() {
    let app = setup_test_app();
    let author = app.seed_user(Role::Admin).await;

    let response = app
        .post("/api/blog")
        .bearer(&author.token)
        .json(&json!({ "excerpt": "Nothing else" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(
        body["details"],
        json!(["title is required", "content is required"])
    );
}

#[tokio::test]
#[serial]
async fn test_reading_published_post_counts_views() {
    let app = setup_test_app();
    let author = app.seed_user(Role::Instructor).await;
    let post = create_post(
        &app,
        &author,
        json!({ "title": "Counting", "content": "Short post body", "status": "published" }),
    )
    .await;
    let uri = format!("/api/blog/{}", post["slug"].as_str().unwrap());

    let first: Value = app.get(&uri).send().await.json().await;
    let second: Value = app.get(&uri).send().await.json().await;

    assert_eq!(first["post"]["views"], 1);
    assert_eq!(second["post"]["views"], 2);
}

#[tokio::test]
#[serial]
async fn test_drafts_are_private() {
    let app = setup_test_app();
    let author = app.seed_user(Role::Instructor).await;
    let reader = app.seed_user(Role::User).await;
    let admin = app.seed_user(Role::Admin).await;
    let draft = create_post(
        &app,
        &author,
        json!({ "title": "Work in progress", "content": "Not ready yet" }),
    )
    .await;
    assert_eq!(draft["status"], "draft");
    let uri = format!("/api/blog/{}", draft["id"].as_str().unwrap());

    assert_eq!(app.get(&uri).send().await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.get(&uri).bearer(&reader.token).send().await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&uri).bearer(&author.token).send().await.status(),
        StatusCode::OK
    );

    let public: Value = app.get("/api/blog").send().await.json().await;
    assert_eq!(public["pagination"]["total"], 0);

    let everything: Value = app
        .get("/api/blog")
        .bearer(&admin.token)
        .send()
        .await
        .json()
        .await;
    assert_eq!(everything["pagination"]["total"], 1);
}

#[tokio::test]
#[serial]
async fn test_first_publish_sets_published_at() {
    let app = setup_test_app();
    let author = app.seed_user(Role::Instructor).await;
    let draft = create_post(
        &app,
        &author,
        json!({ "title": "Later", "content": "Will be published" }),
    )
    .await;
    assert!(draft["publishedAt"].is_null());
    let uri = format!("/api/blog/{}", draft["id"].as_str().unwrap());

    let response = app
        .put(&uri)
        .bearer(&author.token)
        .json(&json!({ "status": "published" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["post"]["status"], "published");
    assert!(body["post"]["publishedAt"].is_string());
}

#[tokio::test]
#[serial]
async fn test_only_owner_or_admin_can_delete() {
    let app = setup_test_app();
    let author = app.seed_user(Role::Instructor).await;
    let other = app.seed_user(Role::Instructor).await;
    let post = create_post(
        &app,
        &author,
        json!({ "title": "Mine", "content": "Belongs to the author" }),
    )
    .await;
    let uri = format!("/api/blog/{}", post["id"].as_str().unwrap());

    let forbidden = app.delete(&uri).bearer(&other.token).send().await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let response = app.delete(&uri).bearer(&author.token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["deletedId"], post["id"]);
}
