//! HTTP API layer for SnowShare.
//!
//! JSON-over-POST endpoints for posts, reviews and comments. The acting
//! user is resolved upstream by the session gateway and handed in through
//! the `X-User-Id` header.
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, actor_middleware};
