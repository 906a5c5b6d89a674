//! Cascade deletion of posts, reviews and comment threads.
//!
//! Each delete runs in one transaction: ownership is re-checked inside it
//! with the row locked, dependent comments go first, then the row itself filtered by owner. The
//! transaction is committed only when the owner-filtered delete hit a row.
//! Any `?` exit drops the uncommitted transaction, which rolls it back.

use std::sync::Arc;

use serde::Serialize;
use snowshare_common::{AppError, AppResult};
use snowshare_db::entities::ParentKind;
use snowshare_db::repositories::{CommentRepository, PostRepository, ReviewRepository};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::ownership::{Ownership, OwnershipCheck};

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The row exists but belongs to someone else. Nothing changed.
    Forbidden,
    /// The row does not exist (or vanished before the delete). Nothing changed.
    NotFound,
    /// The row and its dependent comments are gone.
    Deleted,
}

/// Deletes rows together with the comments that hang off them.
#[derive(Clone)]
pub struct CascadeDeleteCoordinator {
    db: Arc<DatabaseConnection>,
}

impl CascadeDeleteCoordinator {
    /// Create a new coordinator over the shared pool.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Delete a post or review and all of its comments.
    pub async fn delete_with_cascade(
        &self,
        kind: ParentKind,
        id: &str,
        actor_id: &str,
    ) -> AppResult<DeleteOutcome> {
        let txn = self.begin().await?;

        match OwnershipCheck::resolve_in(&txn, kind, id, actor_id).await? {
            Ownership::Owner => {}
            Ownership::NotOwner => {
                rollback(txn).await?;
                tracing::info!(kind = %kind, id = %id, actor_id = %actor_id, "Delete refused, not owner");
                return Ok(DeleteOutcome::Forbidden);
            }
            Ownership::Missing => {
                rollback(txn).await?;
                return Ok(DeleteOutcome::NotFound);
            }
        }

        let comments = CommentRepository::delete_by_parent_in(&txn, kind, id).await?;

        let rows = match kind {
            ParentKind::Post => PostRepository::delete_owned_in(&txn, id, actor_id).await?,
            ParentKind::Review => ReviewRepository::delete_owned_in(&txn, id, actor_id).await?,
        };

        if rows == 0 {
            // Lost a race with another delete after the re-check.
            rollback(txn).await?;
            tracing::debug!(kind = %kind, id = %id, "Entity vanished before delete");
            return Ok(DeleteOutcome::NotFound);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            kind = %kind,
            id = %id,
            actor_id = %actor_id,
            comments,
            "Entity deleted with comments"
        );

        Ok(DeleteOutcome::Deleted)
    }

    /// Delete a comment and its replies.
    pub async fn delete_comment(&self, id: &str, actor_id: &str) -> AppResult<DeleteOutcome> {
        let txn = self.begin().await?;

        match OwnershipCheck::resolve_comment_in(&txn, id, actor_id).await? {
            Ownership::Owner => {}
            Ownership::NotOwner => {
                rollback(txn).await?;
                tracing::info!(comment_id = %id, actor_id = %actor_id, "Comment delete refused, not owner");
                return Ok(DeleteOutcome::Forbidden);
            }
            Ownership::Missing => {
                rollback(txn).await?;
                return Ok(DeleteOutcome::NotFound);
            }
        }

        let replies = CommentRepository::delete_replies_in(&txn, id).await?;
        let rows = CommentRepository::delete_owned_in(&txn, id, actor_id).await?;

        if rows == 0 {
            rollback(txn).await?;
            return Ok(DeleteOutcome::NotFound);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(comment_id = %id, actor_id = %actor_id, replies, "Comment deleted");

        Ok(DeleteOutcome::Deleted)
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn rollback(txn: DatabaseTransaction) -> AppResult<()> {
    txn.rollback()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
