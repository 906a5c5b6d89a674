//! Read path for a post or review together with its comment tree.

use serde::Serialize;
use snowshare_common::AppResult;
use snowshare_db::entities::ParentKind;
use snowshare_db::repositories::{CommentRepository, PostRepository, ReviewRepository};

use super::comment::{CommentService, CommentThread};
use super::post::PostResponse;
use super::review::ReviewResponse;
use super::view_count::ViewCountAccumulator;

/// A post or a review.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoardEntity {
    /// A community post.
    Post(PostResponse),
    /// A saltbox review.
    Review(ReviewResponse),
}

impl BoardEntity {
    /// View count as shown to the reader.
    #[must_use]
    pub const fn view_count(&self) -> i32 {
        match self {
            Self::Post(post) => post.view_count,
            Self::Review(review) => review.view_count,
        }
    }

    fn view_count_mut(&mut self) -> &mut i32 {
        match self {
            Self::Post(post) => &mut post.view_count,
            Self::Review(review) => &mut review.view_count,
        }
    }
}

/// An entity with its assembled comment tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityWithComments {
    /// The post or review, view count already bumped by one.
    pub entity: BoardEntity,
    /// Top-level comments in order, each with its replies.
    pub comments: Vec<CommentThread>,
}

/// Composes entity lookup, comment assembly and view counting.
#[derive(Clone)]
pub struct BoardService {
    post_repo: PostRepository,
    review_repo: ReviewRepository,
    comment_repo: CommentRepository,
    comment_service: CommentService,
    views: ViewCountAccumulator,
}

impl BoardService {
    /// Create a new board service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        review_repo: ReviewRepository,
        comment_repo: CommentRepository,
        comment_service: CommentService,
        views: ViewCountAccumulator,
    ) -> Self {
        Self {
            post_repo,
            review_repo,
            comment_repo,
            comment_service,
            views,
        }
    }

    /// Fetch an entity and its comment tree, counting the view.
    ///
    /// Returns `None` when the entity does not exist. The view count update
    /// runs in the background; the returned count already includes it.
    pub async fn get_with_comments(
        &self,
        kind: ParentKind,
        id: &str,
    ) -> AppResult<Option<EntityWithComments>> {
        let (mut entity, rows) = match kind {
            ParentKind::Post => {
                let Some(post) = self.post_repo.find_by_id(id).await? else {
                    return Ok(None);
                };
                let rows = self.comment_repo.find_by_parent(kind, id).await?;
                (BoardEntity::Post(post.into()), rows)
            }
            ParentKind::Review => {
                let Some(review) = self.review_repo.find_by_id(id).await? else {
                    return Ok(None);
                };
                let rows = self.comment_repo.find_by_parent(kind, id).await?;
                let count = rows.len() as u64;
                (
                    BoardEntity::Review(ReviewResponse::with_comment_count(review, count)),
                    rows,
                )
            }
        };

        drop(self.views.increment(kind, id));
        let shown = ViewCountAccumulator::optimistic(entity.view_count());
        *entity.view_count_mut() = shown;

        let comments = self.comment_service.threads(rows).await?;

        Ok(Some(EntityWithComments { entity, comments }))
    }
}
