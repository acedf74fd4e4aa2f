// Curriculum endpoints
// GET/PUT /api/products/{id}/modules

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use crate::{
    app::AppState,
    middleware::{AuthenticatedUser, OptionalUser},
    utils::ApiError,
};

/// GET /api/products/{id}/modules
pub async fn get_modules(
    State(state): State<AppState>,
    caller: OptionalUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let modules = state.curriculum.get_modules(&id, caller.as_ref()).await?;
    Ok(Json(json!({ "modules": modules })))
}

/// PUT /api/products/{id}/modules
///
/// Body: `{ "modules": [...], "version"?: n }`. The body shape is checked after
/// authorization so that anonymous callers always get 401.
pub async fn update_modules(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state.curriculum.replace_modules(&id, body, &caller).await?;

    Ok(Json(json!({
        "modules": update.modules,
        "version": update.version,
        "message": update.message,
    })))
}
