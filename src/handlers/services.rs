// Service offering endpoints
// GET/POST /api/services, GET/PUT/DELETE /api/services/{idOrSlug}, PATCH /api/services/bulk

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    app::AppState,
    middleware::{AuthenticatedUser, OptionalUser},
    models::{BulkServiceRequest, CreateServiceRequest, ServiceListParams, UpdateServiceRequest},
    repositories::LookupKey,
    utils::ApiError,
};

pub async fn list_services(
    State(state): State<AppState>,
    caller: OptionalUser,
    WithRejection(Query(params), _): WithRejection<Query<ServiceListParams>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.services.list(params, caller.as_ref()).await?;

    Ok(Json(json!({
        "services": listing.items,
        "pagination": listing.pagination,
        "filters": listing.filters,
    })))
}

pub async fn create_service(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateServiceRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.services.create(request, &caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "service": service,
            "message": "Service created successfully",
        })),
    ))
}

pub async fn get_service(
    State(state): State<AppState>,
    caller: OptionalUser,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .get(&LookupKey::parse(&id_or_slug), caller.as_ref())
        .await?;

    Ok(Json(json!({ "service": service })))
}

pub async fn update_service(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateServiceRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .update(&LookupKey::parse(&id_or_slug), request, &caller)
        .await?;

    Ok(Json(json!({
        "service": service,
        "message": "Service updated successfully",
    })))
}

pub async fn delete_service(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted_id = state
        .services
        .delete(&LookupKey::parse(&id_or_slug), &caller)
        .await?;

    Ok(Json(json!({
        "deletedId": deleted_id,
        "message": "Service deleted successfully",
    })))
}

/// PATCH /api/services/bulk
pub async fn bulk_services(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<BulkServiceRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.services.bulk(request, &caller).await?;
    Ok(Json(outcome))
}
