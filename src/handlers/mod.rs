// HTTP handlers and their route builders.
// Every builder is nested under /api by `create_router`.

pub mod auth;
pub mod blog;
pub mod contact;
pub mod health;
pub mod modules;
pub mod products;
pub mod services;

use crate::app::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};

// Authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

// Product catalog and curriculum routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/{id}/modules",
            get(modules::get_modules).put(modules::update_modules),
        )
}

// Static segments win over captures, so /bulk never reaches get_service
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(services::list_services).post(services::create_service),
        )
        .route("/bulk", patch(services::bulk_services))
        .route(
            "/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
}

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::list_posts).post(blog::create_post))
        .route(
            "/{id}",
            get(blog::get_post)
                .put(blog::update_post)
                .delete(blog::delete_post),
        )
}
