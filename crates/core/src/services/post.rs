//! Post service (free board).

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use snowshare_common::{AppError, AppResult, IdGenerator};
use snowshare_db::entities::{ParentKind, post};
use snowshare_db::repositories::PostRepository;
use validator::Validate;

use super::cascade::{CascadeDeleteCoordinator, DeleteOutcome};
use super::ownership::OwnershipCheck;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Input for updating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    pub post_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Response for a post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub view_count: i32,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            content: p.content,
            view_count: p.view_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for managing posts.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    ownership: OwnershipCheck,
    cascade: CascadeDeleteCoordinator,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        ownership: OwnershipCheck,
        cascade: CascadeDeleteCoordinator,
    ) -> Self {
        Self {
            post_repo,
            ownership,
            cascade,
            id_gen: IdGenerator::new(),
        }
    }

    /// List posts, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<PostResponse>> {
        let posts = self.post_repo.find_all(limit, offset).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<PostResponse> {
        Ok(self.post_repo.get_by_id(id).await?.into())
    }

    /// Create a new post.
    pub async fn create(&self, user_id: &str, input: CreatePostInput) -> AppResult<PostResponse> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title),
            content: Set(input.content),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, user_id = %user_id, "Post created");

        Ok(post.into())
    }

    /// Update a post. Only the owner may do this.
    pub async fn update(&self, user_id: &str, input: UpdatePostInput) -> AppResult<PostResponse> {
        input.validate()?;

        self.ownership
            .resolve(ParentKind::Post, &input.post_id, user_id)
            .await?
            .require("post")?;

        let rows = self
            .post_repo
            .update_owned(&input.post_id, user_id, &input.title, &input.content)
            .await?;

        if rows == 0 {
            return Err(AppError::NotFound("post not found".to_string()));
        }

        self.get(&input.post_id).await
    }

    /// Delete a post and its comments.
    pub async fn delete(&self, user_id: &str, post_id: &str) -> AppResult<DeleteOutcome> {
        self.cascade
            .delete_with_cascade(ParentKind::Post, post_id, user_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Snow day".to_string(),
            content: "Roads are closed".to_string(),
            view_count: 7,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> PostService {
        let db = Arc::new(db);
        PostService::new(
            PostRepository::new(db.clone()),
            OwnershipCheck::new(db.clone()),
            CascadeDeleteCoordinator::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .create(
                "u1",
                CreatePostInput {
                    title: String::new(),
                    content: "body".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .create(
                "u1",
                CreatePostInput {
                    title: "a".repeat(201),
                    content: "body".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1")]])
            .into_connection();

        let post = service(db)
            .create(
                "u1",
                CreatePostInput {
                    title: "Snow day".to_string(),
                    content: "Roads are closed".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(post.user_id, "u1");
        assert_eq!(post.title, "Snow day");
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1")]])
            .into_connection();

        let result = service(db)
            .update(
                "u2",
                UpdatePostInput {
                    post_id: "p1".to_string(),
                    title: "Mine now".to_string(),
                    content: "x".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db)
            .update(
                "u1",
                UpdatePostInput {
                    post_id: "gone".to_string(),
                    title: "t".to_string(),
                    content: "c".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let mut updated = create_test_post("p1", "u1");
        updated.title = "Plowed".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[updated]])
            .into_connection();

        let post = service(db)
            .update(
                "u1",
                UpdatePostInput {
                    post_id: "p1".to_string(),
                    title: "Plowed".to_string(),
                    content: "Roads are open".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(post.title, "Plowed");
    }
}
