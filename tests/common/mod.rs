// Common test utilities shared across integration tests.
// Every TestApp runs on its own in-memory store, so tests never share data.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, Response, StatusCode},
    Router,
};
use catalog_backend_core::{
    app::AppState,
    app_config::AppConfig,
    create_router,
    models::{Role, User},
};
use serde::Serialize;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Generate a unique email for test isolation
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

/// A seeded user together with a valid access token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "GET", uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "POST", uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PATCH", uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "DELETE", uri)
    }

    pub fn options(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "OPTIONS", uri)
    }

    /// Insert a user directly and mint a token for it
    pub async fn seed_user(&self, role: Role) -> TestUser {
        let user = self
            .state
            .accounts
            .create_user(
                format!("Test {}", role),
                unique_email(role.as_str()),
                TEST_PASSWORD.to_string(),
                role,
            )
            .await
            .unwrap();
        let token = self.state.jwt_service.generate_access_token(&user).unwrap();

        TestUser { user, token }
    }

    /// Create a product through the API and return its JSON
    pub async fn create_product(&self, owner: &TestUser, overrides: Value) -> Value {
        let mut body = product_body("Rust for Backend Engineers");
        if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }

        let response = self
            .post("/api/products")
            .bearer(&owner.token)
            .json(&body)
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        response.json::<Value>().await["product"].clone()
    }
}

/// Minimal valid product payload
pub fn product_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "A practical course on building services in Rust.",
        "type": "Course",
        "price": 49.0,
        "category": "Programming",
        "instructor": { "name": "Ferris Crab" },
        "status": "published",
    })
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &str, uri: &str) -> Self {
        Self {
            app,
            method: method.to_string(),
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Body::empty(),
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Body::from(serde_json::to_vec(body).unwrap());
        self
    }

    /// Send a raw, possibly malformed, JSON body
    pub fn raw_json(mut self, body: &str) -> Self {
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Body::from(body.to_string());
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {}", token))
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method.as_str()).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(self.body).unwrap();

        let response = self.app.app.clone().oneshot(request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// First Set-Cookie header, if any
    pub fn set_cookie(&self) -> Option<String> {
        self.response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

/// Setup test application on the in-memory store
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(AppConfig::for_test())
}

pub fn setup_test_app_with(config: AppConfig) -> TestApp {
    let state = AppState::in_memory(config).expect("Failed to build test state");
    let app = create_router(state.clone());

    TestApp { app, state }
}
