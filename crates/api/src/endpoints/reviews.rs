//! Reviews endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use snowshare_common::{AppError, AppResult};
use snowshare_core::EntityWithComments;
use snowshare_core::services::review::{CreateReviewInput, ReviewResponse, UpdateReviewInput};
use snowshare_db::entities::ParentKind;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, deleted},
};

// ==================== Request Types ====================

/// List reviews request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// List reviews of a salt box request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaltboxReviewsRequest {
    pub saltbox_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Review ID request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewIdRequest {
    pub review_id: String,
}

// ==================== Handlers ====================

/// List reviews, newest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListReviewsRequest>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let limit = req.limit.min(100);
    let reviews = state.review_service.list(limit, req.offset).await?;

    Ok(ApiResponse::ok(reviews))
}

/// List reviews of one salt box.
async fn by_saltbox(
    State(state): State<AppState>,
    Json(req): Json<SaltboxReviewsRequest>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let limit = req.limit.min(100);
    let reviews = state
        .review_service
        .list_by_saltbox(&req.saltbox_id, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(reviews))
}

/// Show a review with its comments.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ReviewIdRequest>,
) -> AppResult<ApiResponse<EntityWithComments>> {
    let review = state
        .board_service
        .get_with_comments(ParentKind::Review, &req.review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    Ok(ApiResponse::ok(review))
}

/// Create a review.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReviewInput>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.create(&actor.id, input).await?;

    Ok(ApiResponse::ok(review))
}

/// Update a review.
async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateReviewInput>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.update(&actor.id, input).await?;

    Ok(ApiResponse::ok(review))
}

/// Delete a review and its comments.
async fn delete(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewIdRequest>,
) -> AppResult<StatusCode> {
    let outcome = state
        .review_service
        .delete(&actor.id, &req.review_id)
        .await?;

    deleted(outcome, "review")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/by-saltbox", post(by_saltbox))
        .route("/show", post(show))
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
}
