// GET /api/health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{app::AppState, db};

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (healthy, database) = match &state.diesel_pool {
        Some(pool) => match db::check_diesel_health(pool).await {
            Ok(()) => (
                true,
                json!({
                    "status": "healthy",
                    "max_connections": state.config.database_max_connections,
                    "error": null
                }),
            ),
            Err(e) => (
                false,
                json!({
                    "status": "unhealthy",
                    "error": format!("Database connection failed: {}", e)
                }),
            ),
        },
        None => (true, json!({ "status": "not_configured", "error": null })),
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": timestamp,
        "components": {
            "database": database,
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
