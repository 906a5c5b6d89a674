//! Posts endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use snowshare_common::{AppError, AppResult};
use snowshare_core::services::post::{CreatePostInput, PostResponse, UpdatePostInput};
use snowshare_core::EntityWithComments;
use snowshare_db::entities::ParentKind;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, deleted},
};

// ==================== Request Types ====================

/// List posts request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Post ID request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdRequest {
    pub post_id: String,
}

// ==================== Handlers ====================

/// List posts, newest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListPostsRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = req.limit.min(100);
    let posts = state.post_service.list(limit, req.offset).await?;

    Ok(ApiResponse::ok(posts))
}

/// Show a post with its comments.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<EntityWithComments>> {
    let post = state
        .board_service
        .get_with_comments(ParentKind::Post, &req.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::ok(post))
}

/// Create a post.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&actor.id, input).await?;

    Ok(ApiResponse::ok(post))
}

/// Update a post.
async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(&actor.id, input).await?;

    Ok(ApiResponse::ok(post))
}

/// Delete a post and its comments.
async fn delete(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<StatusCode> {
    let outcome = state.post_service.delete(&actor.id, &req.post_id).await?;

    deleted(outcome, "post")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
}
