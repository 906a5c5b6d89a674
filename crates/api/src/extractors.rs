//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use snowshare_common::AppError;

/// Acting user ID, placed in request extensions by
/// [`actor_middleware`](crate::middleware::actor_middleware).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
}

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}
