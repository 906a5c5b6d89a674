//! Review service (salt box reviews).

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use snowshare_common::{AppError, AppResult, IdGenerator};
use snowshare_db::entities::{ParentKind, review};
use snowshare_db::repositories::{CommentRepository, ReviewRepository};
use validator::Validate;

use super::cascade::{CascadeDeleteCoordinator, DeleteOutcome};
use super::ownership::OwnershipCheck;

/// Input for creating a review.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    #[validate(length(min = 1, max = 64))]
    pub saltbox_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Input for updating a review.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewInput {
    pub review_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Response for a review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub user_id: String,
    pub saltbox_id: String,
    pub rating: i32,
    pub content: String,
    pub view_count: i32,
    pub comment_count: u64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl ReviewResponse {
    /// Build a response with a known comment count.
    #[must_use]
    pub fn with_comment_count(r: review::Model, comment_count: u64) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            saltbox_id: r.saltbox_id,
            rating: r.rating,
            content: r.content,
            view_count: r.view_count,
            comment_count,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for managing reviews.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    comment_repo: CommentRepository,
    ownership: OwnershipCheck,
    cascade: CascadeDeleteCoordinator,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        comment_repo: CommentRepository,
        ownership: OwnershipCheck,
        cascade: CascadeDeleteCoordinator,
    ) -> Self {
        Self {
            review_repo,
            comment_repo,
            ownership,
            cascade,
            id_gen: IdGenerator::new(),
        }
    }

    /// List reviews, newest first, with comment counts.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<ReviewResponse>> {
        let reviews = self.review_repo.find_all(limit, offset).await?;
        self.with_counts(reviews).await
    }

    /// List reviews of one salt box, newest first, with comment counts.
    pub async fn list_by_saltbox(
        &self,
        saltbox_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReviewResponse>> {
        let reviews = self
            .review_repo
            .find_by_saltbox(saltbox_id, limit, offset)
            .await?;
        self.with_counts(reviews).await
    }

    /// Get a review by ID, with its comment count.
    pub async fn get(&self, id: &str) -> AppResult<ReviewResponse> {
        let review = self.review_repo.get_by_id(id).await?;
        let mut responses = self.with_counts(vec![review]).await?;
        responses
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Review not found: {id}")))
    }

    /// Create a new review.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateReviewInput,
    ) -> AppResult<ReviewResponse> {
        input.validate()?;

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            saltbox_id: Set(input.saltbox_id),
            rating: Set(input.rating),
            content: Set(input.content),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let review = self.review_repo.create(model).await?;
        tracing::info!(
            review_id = %review.id,
            saltbox_id = %review.saltbox_id,
            user_id = %user_id,
            "Review created"
        );

        Ok(ReviewResponse::with_comment_count(review, 0))
    }

    /// Update a review. Only the owner may do this.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateReviewInput,
    ) -> AppResult<ReviewResponse> {
        input.validate()?;

        self.ownership
            .resolve(ParentKind::Review, &input.review_id, user_id)
            .await?
            .require("review")?;

        let rows = self
            .review_repo
            .update_owned(&input.review_id, user_id, input.rating, &input.content)
            .await?;

        if rows == 0 {
            return Err(AppError::NotFound("review not found".to_string()));
        }

        self.get(&input.review_id).await
    }

    /// Delete a review and its comments.
    pub async fn delete(&self, user_id: &str, review_id: &str) -> AppResult<DeleteOutcome> {
        self.cascade
            .delete_with_cascade(ParentKind::Review, review_id, user_id)
            .await
    }

    async fn with_counts(&self, reviews: Vec<review::Model>) -> AppResult<Vec<ReviewResponse>> {
        let ids: Vec<String> = reviews.iter().map(|r| r.id.clone()).collect();
        let counts = self
            .comment_repo
            .count_by_parents(ParentKind::Review, &ids)
            .await?;

        Ok(reviews
            .into_iter()
            .map(|r| {
                let count = counts.get(&r.id).copied().unwrap_or(0);
                ReviewResponse::with_comment_count(r, count)
            })
            .collect())
    }
}
