//! Comments endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use snowshare_common::AppResult;
use snowshare_core::services::comment::{
    CommentResponse, CommentThread, CreateCommentInput, UpdateCommentInput,
};
use snowshare_db::entities::ParentKind;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, deleted},
};

// ==================== Request Types ====================

/// List comments of a post or review.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub parent_kind: ParentKind,
    pub parent_id: String,
}

/// Comment ID request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

// ==================== Handlers ====================

/// Comment tree of a post or review.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentThread>>> {
    let threads = state
        .comment_service
        .list_for(req.parent_kind, &req.parent_id)
        .await?;

    Ok(ApiResponse::ok(threads))
}

/// Show a comment.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&req.comment_id).await?;

    Ok(ApiResponse::ok(comment))
}

/// Create a comment or reply.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.create(&actor.id, input).await?;

    Ok(ApiResponse::ok(comment))
}

/// Update a comment.
async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.update(&actor.id, input).await?;

    Ok(ApiResponse::ok(comment))
}

/// Delete a comment and its replies.
async fn delete(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<StatusCode> {
    let outcome = state
        .comment_service
        .delete(&actor.id, &req.comment_id)
        .await?;

    deleted(outcome, "comment")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
}
