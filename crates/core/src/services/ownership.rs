//! Ownership check for posts, reviews and comments.

use std::sync::Arc;

use snowshare_common::{AppError, AppResult};
use snowshare_db::entities::ParentKind;
use snowshare_db::repositories::{CommentRepository, PostRepository, ReviewRepository};
use sea_orm::{ConnectionTrait, DatabaseConnection, sea_query::LockType};

/// Relationship between an actor and a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The row exists and belongs to the actor.
    Owner,
    /// The row exists and belongs to someone else.
    NotOwner,
    /// The row does not exist.
    Missing,
}

impl Ownership {
    /// Classify a looked-up owner id against the actor.
    #[must_use]
    pub fn of(owner_id: Option<&str>, actor_id: &str) -> Self {
        match owner_id {
            None => Self::Missing,
            Some(owner) if owner == actor_id => Self::Owner,
            Some(_) => Self::NotOwner,
        }
    }

    /// Turn a non-owner result into the matching error.
    pub fn require(self, what: &str) -> AppResult<()> {
        match self {
            Self::Owner => Ok(()),
            Self::NotOwner => Err(AppError::Forbidden(format!("You do not own this {what}"))),
            Self::Missing => Err(AppError::NotFound(format!("{what} not found"))),
        }
    }
}

/// Answers "does this actor own that row?".
///
/// Every mutation path asks here first. The `_in` variants take an open
/// transaction and lock the looked-up row until it ends: deletes hold an
/// exclusive lock, comment inserts a shared one, so the two serialize.
/// SQLite has no row locks; its database-level write lock serializes them.
#[derive(Clone)]
pub struct OwnershipCheck {
    db: Arc<DatabaseConnection>,
}

impl OwnershipCheck {
    /// Create a new ownership check.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Whether `actor_id` owns the entity. A missing entity is not owned.
    pub async fn is_owner(
        &self,
        kind: ParentKind,
        entity_id: &str,
        actor_id: &str,
    ) -> AppResult<bool> {
        Ok(self.resolve(kind, entity_id, actor_id).await? == Ownership::Owner)
    }

    /// Whether the post or review exists at all.
    pub async fn exists(&self, kind: ParentKind, entity_id: &str) -> AppResult<bool> {
        Ok(Self::owner_of_in(self.db.as_ref(), kind, entity_id, None)
            .await?
            .is_some())
    }

    /// Whether the post or review exists, holding a shared lock on it.
    pub async fn exists_in<C: ConnectionTrait>(
        conn: &C,
        kind: ParentKind,
        entity_id: &str,
    ) -> AppResult<bool> {
        Ok(Self::owner_of_in(conn, kind, entity_id, Some(LockType::Share))
            .await?
            .is_some())
    }

    /// Resolve ownership of a post or review.
    pub async fn resolve(
        &self,
        kind: ParentKind,
        entity_id: &str,
        actor_id: &str,
    ) -> AppResult<Ownership> {
        let owner_id = Self::owner_of_in(self.db.as_ref(), kind, entity_id, None).await?;
        Ok(Ownership::of(owner_id.as_deref(), actor_id))
    }

    /// Resolve ownership of a comment.
    pub async fn resolve_comment(&self, comment_id: &str, actor_id: &str) -> AppResult<Ownership> {
        let owner_id = CommentRepository::find_by_id_in(self.db.as_ref(), comment_id)
            .await?
            .map(|comment| comment.user_id);

        Ok(Ownership::of(owner_id.as_deref(), actor_id))
    }

    /// Resolve ownership of a post or review inside a transaction, locking the row.
    pub async fn resolve_in<C: ConnectionTrait>(
        conn: &C,
        kind: ParentKind,
        entity_id: &str,
        actor_id: &str,
    ) -> AppResult<Ownership> {
        let owner_id = Self::owner_of_in(conn, kind, entity_id, Some(LockType::Update)).await?;
        Ok(Ownership::of(owner_id.as_deref(), actor_id))
    }

    async fn owner_of_in<C: ConnectionTrait>(
        conn: &C,
        kind: ParentKind,
        entity_id: &str,
        lock: Option<LockType>,
    ) -> AppResult<Option<String>> {
        let owner_id = match (kind, lock) {
            (ParentKind::Post, None) => PostRepository::find_by_id_in(conn, entity_id)
                .await?
                .map(|post| post.user_id),
            (ParentKind::Post, Some(lock)) => PostRepository::find_locked_in(conn, entity_id, lock)
                .await?
                .map(|post| post.user_id),
            (ParentKind::Review, None) => ReviewRepository::find_by_id_in(conn, entity_id)
                .await?
                .map(|review| review.user_id),
            (ParentKind::Review, Some(lock)) => {
                ReviewRepository::find_locked_in(conn, entity_id, lock)
                    .await?
                    .map(|review| review.user_id)
            }
        };

        Ok(owner_id)
    }

    /// Resolve ownership of a comment inside a transaction, locking the row.
    pub async fn resolve_comment_in<C: ConnectionTrait>(
        conn: &C,
        comment_id: &str,
        actor_id: &str,
    ) -> AppResult<Ownership> {
        let owner_id = CommentRepository::find_locked_in(conn, comment_id, LockType::Update)
            .await?
            .map(|comment| comment.user_id);

        Ok(Ownership::of(owner_id.as_deref(), actor_id))
    }
}
