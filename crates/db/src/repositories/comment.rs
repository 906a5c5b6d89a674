//! Comment repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Comment, ParentKind, comment};
use chrono::Utc;
use snowshare_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, sea_query::{Expr, LockType},
};

/// Number of comments attached to one parent entity.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ParentCommentCount {
    pub parent_id: String,
    pub count: i64,
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Self::find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a comment by ID on the given connection or transaction.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
    ) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID and lock the row until the transaction ends.
    pub async fn find_locked_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        lock: LockType,
    ) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .lock(lock)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All comments of one parent entity, oldest first.
    ///
    /// Ties on `created_at` fall back to the id, which is time-ordered.
    pub async fn find_by_parent(
        &self,
        kind: ParentKind,
        parent_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentKind.eq(kind))
            .filter(comment::Column::ParentId.eq(parent_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comment counts for a batch of parents of the same kind.
    ///
    /// Parents without comments are absent from the map.
    pub async fn count_by_parents(
        &self,
        kind: ParentKind,
        parent_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Comment::find()
            .select_only()
            .column(comment::Column::ParentId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::ParentKind.eq(kind))
            .filter(comment::Column::ParentId.is_in(parent_ids.to_vec()))
            .group_by(comment::Column::ParentId)
            .into_model::<ParentCommentCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.parent_id, u64::try_from(row.count).unwrap_or(0)))
            .collect())
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        Self::create_in(self.db.as_ref(), model).await
    }

    /// Create a new comment on the given connection or transaction.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update the content of a comment owned by `user_id`.
    pub async fn update_owned(&self, id: &str, user_id: &str, content: &str) -> AppResult<u64> {
        let result = Comment::update_many()
            .col_expr(comment::Column::Content, Expr::value(content))
            .col_expr(comment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete every comment attached to a parent entity, replies included.
    pub async fn delete_by_parent_in<C: ConnectionTrait>(
        conn: &C,
        kind: ParentKind,
        parent_id: &str,
    ) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(comment::Column::ParentKind.eq(kind))
            .filter(comment::Column::ParentId.eq(parent_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete the replies of a top-level comment.
    pub async fn delete_replies_in<C: ConnectionTrait>(conn: &C, id: &str) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(comment::Column::ParentCommentId.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete a single comment owned by `user_id`.
    pub async fn delete_owned_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        user_id: &str,
    ) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(
                Condition::all()
                    .add(comment::Column::Id.eq(id))
                    .add(comment::Column::UserId.eq(user_id)),
            )
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_comment(id: &str, parent_comment_id: Option<&str>) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            parent_id: "p1".to_string(),
            parent_kind: ParentKind::Post,
            user_id: "u1".to_string(),
            content: format!("comment {id}"),
            parent_comment_id: parent_comment_id.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_parent() {
        let c1 = create_test_comment("c1", None);
        let c2 = create_test_comment("c2", Some("c1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_parent(ParentKind::Post, "p1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result[0].is_top_level());
        assert_eq!(result[1].parent_comment_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_count_by_parents() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! {
                        "parent_id" => Value::String(Some(Box::new("r1".to_string()))),
                        "count" => Value::BigInt(Some(4)),
                    },
                    maplit::btreemap! {
                        "parent_id" => Value::String(Some(Box::new("r2".to_string()))),
                        "count" => Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let counts = repo
            .count_by_parents(
                ParentKind::Review,
                &["r1".to_string(), "r2".to_string(), "r3".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(counts.get("r1"), Some(&4));
        assert_eq!(counts.get("r2"), Some(&1));
        assert_eq!(counts.get("r3"), None);
    }

    #[tokio::test]
    async fn test_count_by_parents_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = CommentRepository::new(db);
        let counts = repo.count_by_parents(ParentKind::Post, &[]).await.unwrap();

        assert!(counts.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let rows = CommentRepository::delete_by_parent_in(&db, ParentKind::Post, "p1")
            .await
            .unwrap();

        assert_eq!(rows, 3);
    }
}
