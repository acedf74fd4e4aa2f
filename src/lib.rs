// Library exports for the catalog backend
// main.rs and the integration tests build the router through this crate

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod services;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, StorageBackend, CONFIG};
pub use db::DieselPool;
pub use middleware::{AuthenticatedUser, OptionalUser};
pub use repositories::Store;
pub use utils::ApiError;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the full API router on top of an initialized state
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/contact", post(handlers::contact::submit_contact))
        .nest("/auth", handlers::auth_routes())
        .nest("/products", handlers::product_routes())
        .nest("/services", handlers::service_routes())
        .nest("/blog", handlers::blog_routes());

    Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect storage, apply migrations and wire services.
/// The memory backend skips the database entirely.
pub async fn initialize_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let (store, diesel_pool) = match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            (Store::in_memory(), None)
        },
        StorageBackend::Postgres => {
            migrations::run_startup_migrations(&config).await?;

            info!("Initializing database pool...");
            let pool =
                db::create_diesel_pool(db::DieselDatabaseConfig::from_config(&config)).await?;
            (Store::postgres(pool.clone()), Some(pool))
        },
    };

    let state = AppState::new(config, store, diesel_pool)?;
    Ok(state)
}
