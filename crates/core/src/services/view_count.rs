//! Best-effort view counting.

use snowshare_db::entities::ParentKind;
use snowshare_db::repositories::{PostRepository, ReviewRepository};
use tokio::task::JoinHandle;

/// Bumps denormalized view counters off the request path.
#[derive(Clone)]
pub struct ViewCountAccumulator {
    post_repo: PostRepository,
    review_repo: ReviewRepository,
}

impl ViewCountAccumulator {
    /// Create a new accumulator.
    #[must_use]
    pub const fn new(post_repo: PostRepository, review_repo: ReviewRepository) -> Self {
        Self {
            post_repo,
            review_repo,
        }
    }

    /// Spawn `view_count = view_count + 1` for the entity.
    ///
    /// Failures are logged and swallowed. Callers are not expected to await
    /// the handle; it is returned so tests can.
    pub fn increment(&self, kind: ParentKind, id: &str) -> JoinHandle<()> {
        let accumulator = self.clone();
        let id = id.to_string();

        tokio::spawn(async move {
            let result = match kind {
                ParentKind::Post => accumulator.post_repo.increment_view_count(&id).await,
                ParentKind::Review => accumulator.review_repo.increment_view_count(&id).await,
            };

            match result {
                Ok(0) => tracing::debug!(kind = %kind, id = %id, "View count target is gone"),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, kind = %kind, id = %id, "Failed to increment view count");
                }
            }
        })
    }

    /// The count a reader should see for a view it just triggered.
    #[must_use]
    pub const fn optimistic(persisted: i32) -> i32 {
        persisted.saturating_add(1)
    }
}
