//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use sea_orm::DatabaseConnection;
use snowshare_core::{
    BoardService, CascadeDeleteCoordinator, CommentService, OwnershipCheck, PostService,
    ReviewService, ViewCountAccumulator,
};
use snowshare_db::repositories::{
    CommentRepository, PostRepository, ReviewRepository, UserRepository,
};

use crate::extractors::Actor;

/// Header carrying the user ID resolved by the session gateway.
pub const ACTOR_HEADER: &str = "x-user-id";

const MAX_ACTOR_ID_LEN: usize = 64;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub post_service: PostService,
    pub review_service: ReviewService,
    pub comment_service: CommentService,
    pub board_service: BoardService,
}

impl AppState {
    /// Wire repositories and services over one shared pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let post_repo = PostRepository::new(Arc::clone(&db));
        let review_repo = ReviewRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let user_repo = UserRepository::new(Arc::clone(&db));

        let ownership = OwnershipCheck::new(Arc::clone(&db));
        let cascade = CascadeDeleteCoordinator::new(Arc::clone(&db));
        let views = ViewCountAccumulator::new(post_repo.clone(), review_repo.clone());

        let post_service = PostService::new(post_repo.clone(), ownership.clone(), cascade.clone());
        let review_service = ReviewService::new(
            review_repo.clone(),
            comment_repo.clone(),
            ownership.clone(),
            cascade.clone(),
        );
        let comment_service =
            CommentService::new(db, comment_repo.clone(), user_repo, ownership, cascade);
        let board_service = BoardService::new(
            post_repo,
            review_repo,
            comment_repo,
            comment_service.clone(),
            views,
        );

        Self {
            post_service,
            review_service,
            comment_service,
            board_service,
        }
    }
}

/// Actor middleware.
///
/// Copies a well-formed `X-User-Id` header into request extensions.
/// Requests without one continue anonymously; handlers that need an actor
/// reject them through [`AuthUser`](crate::extractors::AuthUser).
pub async fn actor_middleware(mut req: Request<Body>, next: Next) -> Response {
    if let Some(value) = req.headers().get(ACTOR_HEADER)
        && let Ok(id) = value.to_str()
    {
        let id = id.trim();
        if !id.is_empty() && id.len() <= MAX_ACTOR_ID_LEN {
            let actor = Actor { id: id.to_string() };
            req.extensions_mut().insert(actor);
        } else {
            tracing::debug!("Ignoring malformed actor header");
        }
    }

    next.run(req).await
}
