//! API endpoints.

#![allow(missing_docs)]

mod comments;
mod posts;
mod reviews;

use axum::{Router, middleware};

use crate::middleware::{AppState, actor_middleware};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router())
        .nest("/reviews", reviews::router())
        .nest("/comments", comments::router())
        .layer(middleware::from_fn(actor_middleware))
}
