// Product catalog endpoints
// GET/POST /api/products, GET/PUT/DELETE /api/products/{idOrSlug}

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
    models::{CreateProductRequest, ProductListParams, UpdateProductRequest},
    repositories::LookupKey,
    utils::ApiError,
};

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    caller: OptionalUser,
    WithRejection(Query(params), _): WithRejection<Query<ProductListParams>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.products.list(params, caller.as_ref()).await?;

    Ok(Json(json!({
        "products": listing.items,
        "pagination": listing.pagination,
        "filters": listing.filters,
    })))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateProductRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.create(request, &caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "product": product,
            "message": "Product created successfully",
        })),
    ))
}

/// GET /api/products/{idOrSlug}
pub async fn get_product(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products
        .get(&LookupKey::parse(&id_or_slug), Some(&caller))
        .await?;

    Ok(Json(json!({ "product": product })))
}

/// PUT /api/products/{idOrSlug}
pub async fn update_product(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProductRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products
        .update(&LookupKey::parse(&id_or_slug), request, &caller)
        .await?;

    Ok(Json(json!({
        "product": product,
        "message": "Product updated successfully",
    })))
}

/// DELETE /api/products/{idOrSlug}
pub async fn delete_product(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted_id = state
        .products
        .delete(&LookupKey::parse(&id_or_slug), &caller)
        .await?;

    Ok(Json(json!({
        "deletedId": deleted_id,
        "message": "Product deleted successfully",
    })))
}
