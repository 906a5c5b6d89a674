//! Comment service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait, sea_query::LockType};
use serde::{Deserialize, Serialize};
use snowshare_common::{AppError, AppResult, IdGenerator};
use snowshare_db::entities::{ParentKind, comment};
use snowshare_db::repositories::{CommentRepository, UserRepository};
use validator::Validate;

use super::cascade::{CascadeDeleteCoordinator, DeleteOutcome};
use super::comment_tree::{TopLevelComment, assemble};
use super::ownership::OwnershipCheck;

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub parent_kind: ParentKind,
    pub parent_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

/// Input for updating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentInput {
    pub comment_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Response for a single comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub parent_kind: ParentKind,
    pub parent_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub content: String,
    pub parent_comment_id: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl CommentResponse {
    fn new(c: comment::Model, usernames: &HashMap<String, String>) -> Self {
        let username = usernames.get(&c.user_id).cloned();
        Self {
            id: c.id,
            parent_kind: c.parent_kind,
            parent_id: c.parent_id,
            user_id: c.user_id,
            username,
            content: c.content,
            parent_comment_id: c.parent_comment_id,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A top-level comment with its replies, ready to serialize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentResponse>,
}

/// Service for managing comments.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    ownership: OwnershipCheck,
    cascade: CascadeDeleteCoordinator,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        ownership: OwnershipCheck,
        cascade: CascadeDeleteCoordinator,
    ) -> Self {
        Self {
            db,
            comment_repo,
            user_repo,
            ownership,
            cascade,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment tree of a post or review.
    pub async fn list_for(&self, kind: ParentKind, parent_id: &str) -> AppResult<Vec<CommentThread>> {
        if !self.ownership.exists(kind, parent_id).await? {
            return Err(AppError::NotFound(format!("{kind} not found")));
        }

        let rows = self.comment_repo.find_by_parent(kind, parent_id).await?;
        self.threads(rows).await
    }

    /// Assemble rows into threads and attach author usernames.
    pub async fn threads(&self, rows: Vec<comment::Model>) -> AppResult<Vec<CommentThread>> {
        let usernames = self.usernames(&rows).await?;

        Ok(assemble(rows)
            .into_iter()
            .map(|TopLevelComment { comment, replies }| CommentThread {
                comment: CommentResponse::new(comment, &usernames),
                replies: replies
                    .into_iter()
                    .map(|reply| CommentResponse::new(reply, &usernames))
                    .collect(),
            })
            .collect())
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<CommentResponse> {
        let comment = self
            .comment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))?;

        let usernames = self.usernames(std::slice::from_ref(&comment)).await?;
        Ok(CommentResponse::new(comment, &usernames))
    }

    /// Create a comment or a reply.
    ///
    /// The parent rows are share-locked for the duration of the insert, so a
    /// concurrent cascade delete either sees the new comment or the insert
    /// sees the parent gone.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<CommentResponse> {
        input.validate()?;

        let kind = input.parent_kind;
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !OwnershipCheck::exists_in(&txn, kind, &input.parent_id).await? {
            return Err(AppError::NotFound(format!("{kind} not found")));
        }

        if let Some(parent_comment_id) = &input.parent_comment_id {
            let parent = CommentRepository::find_locked_in(&txn, parent_comment_id, LockType::Share)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

            if parent.parent_kind != kind || parent.parent_id != input.parent_id {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different thread".to_string(),
                ));
            }

            if !parent.is_top_level() {
                return Err(AppError::Validation(
                    "Replies cannot be nested".to_string(),
                ));
            }
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            parent_id: Set(input.parent_id),
            parent_kind: Set(kind),
            user_id: Set(user_id.to_string()),
            content: Set(input.content),
            parent_comment_id: Set(input.parent_comment_id),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let comment = CommentRepository::create_in(&txn, model).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            comment_id = %comment.id,
            parent_kind = %kind,
            parent_id = %comment.parent_id,
            user_id = %user_id,
            "Comment created"
        );

        let usernames = self.usernames(std::slice::from_ref(&comment)).await?;
        Ok(CommentResponse::new(comment, &usernames))
    }

    /// Update a comment. Only the author may do this.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<CommentResponse> {
        input.validate()?;

        self.ownership
            .resolve_comment(&input.comment_id, user_id)
            .await?
            .require("comment")?;

        let rows = self
            .comment_repo
            .update_owned(&input.comment_id, user_id, &input.content)
            .await?;

        if rows == 0 {
            return Err(AppError::NotFound("comment not found".to_string()));
        }

        self.get(&input.comment_id).await
    }

    /// Delete a comment and its replies.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<DeleteOutcome> {
        self.cascade.delete_comment(comment_id, user_id).await
    }

    async fn usernames(&self, rows: &[comment::Model]) -> AppResult<HashMap<String, String>> {
        let mut user_ids: Vec<String> = rows.iter().map(|c| c.user_id.clone()).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let users = self.user_repo.find_by_ids(&user_ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use snowshare_db::entities::{post, user};

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, parent_id: &str, reply_to: Option<&str>) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            parent_id: parent_id.to_string(),
            parent_kind: ParentKind::Post,
            user_id: "u1".to_string(),
            content: "hello".to_string(),
            parent_comment_id: reply_to.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(
            db.clone(),
            CommentRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            OwnershipCheck::new(db.clone()),
            CascadeDeleteCoordinator::new(db),
        )
    }

    fn reply_input(parent_id: &str, parent_comment_id: &str) -> CreateCommentInput {
        CreateCommentInput {
            parent_kind: ParentKind::Post,
            parent_id: parent_id.to_string(),
            content: "me too".to_string(),
            parent_comment_id: Some(parent_comment_id.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_on_missing_parent_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db)
            .create(
                "u1",
                CreateCommentInput {
                    parent_kind: ParentKind::Post,
                    parent_id: "gone".to_string(),
                    content: "hi".to_string(),
                    parent_comment_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reply_to_other_thread_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1")]])
            .append_query_results([[create_test_comment("c1", "p2", None)]])
            .into_connection();

        let result = service(db).create("u1", reply_input("p1", "c1")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reply_to_reply_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1")]])
            .append_query_results([[create_test_comment("c2", "p1", Some("c1"))]])
            .into_connection();

        let result = service(db).create("u1", reply_input("p1", "c2")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .create(
                "u1",
                CreateCommentInput {
                    parent_kind: ParentKind::Post,
                    parent_id: "p1".to_string(),
                    content: String::new(),
                    parent_comment_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_threads_attach_usernames() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]])
            .into_connection();

        let threads = service(db)
            .threads(vec![
                create_test_comment("c1", "p1", None),
                create_test_comment("c2", "p1", Some("c1")),
            ])
            .await
            .unwrap();

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.username.as_deref(), Some("alice"));
        assert_eq!(threads[0].replies[0].username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_comment("c1", "p1", None)]])
            .into_connection();

        let result = service(db)
            .update(
                "u2",
                UpdateCommentInput {
                    comment_id: "c1".to_string(),
                    content: "edited".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
