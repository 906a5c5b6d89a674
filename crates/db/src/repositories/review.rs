//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, review};
use chrono::Utc;
use snowshare_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::{Expr, LockType},
};

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Self::find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a review by ID on the given connection or transaction.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
    ) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a review by ID and lock the row until the transaction ends.
    pub async fn find_locked_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        lock: LockType,
    ) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .lock(lock)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a review by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<review::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review not found: {id}")))
    }

    /// List reviews, newest first.
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<review::Model>> {
        Review::find()
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reviews about a salt box, newest first.
    pub async fn find_by_saltbox(
        &self,
        saltbox_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::SaltboxId.eq(saltbox_id))
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update rating and content of a review owned by `user_id`.
    pub async fn update_owned(
        &self,
        id: &str,
        user_id: &str,
        rating: i32,
        content: &str,
    ) -> AppResult<u64> {
        let result = Review::update_many()
            .col_expr(review::Column::Rating, Expr::value(rating))
            .col_expr(review::Column::Content, Expr::value(content))
            .col_expr(review::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(review::Column::Id.eq(id))
            .filter(review::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete a review owned by `user_id` on the given connection or transaction.
    pub async fn delete_owned_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        user_id: &str,
    ) -> AppResult<u64> {
        let result = Review::delete_many()
            .filter(review::Column::Id.eq(id))
            .filter(review::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Atomically add one to the view count.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<u64> {
        let result = Review::update_many()
            .col_expr(
                review::Column::ViewCount,
                Expr::col(review::Column::ViewCount).add(1),
            )
            .filter(review::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
