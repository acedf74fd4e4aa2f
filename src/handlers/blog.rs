// Blog endpoints
// GET/POST /api/blog, GET/PUT/DELETE /api/blog/{idOrSlug}

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
    models::{CreatePostRequest, PostListParams, UpdatePostRequest},
    repositories::LookupKey,
    utils::ApiError,
};

pub async fn list_posts(
    State(state): State<AppState>,
    caller: OptionalUser,
    WithRejection(Query(params), _): WithRejection<Query<PostListParams>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.blog.list(params, caller.as_ref()).await?;

    Ok(Json(json!({
        "posts": listing.items,
        "pagination": listing.pagination,
        "filters": listing.filters,
    })))
}

pub async fn create_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreatePostRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.blog.create(request, &caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "post": post,
            "message": "Post created successfully",
        })),
    ))
}

/// Counts a view when the post is published
pub async fn get_post(
    State(state): State<AppState>,
    caller: OptionalUser,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .blog
        .get(&LookupKey::parse(&id_or_slug), caller.as_ref())
        .await?;

    Ok(Json(json!({ "post": post })))
}

pub async fn update_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdatePostRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .blog
        .update(&LookupKey::parse(&id_or_slug), request, &caller)
        .await?;

    Ok(Json(json!({
        "post": post,
        "message": "Post updated successfully",
    })))
}

pub async fn delete_post(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted_id = state
        .blog
        .delete(&LookupKey::parse(&id_or_slug), &caller)
        .await?;

    Ok(Json(json!({
        "deletedId": deleted_id,
        "message": "Post deleted successfully",
    })))
}
