//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snowshare_common::{AppError, AppResult};
use snowshare_core::DeleteOutcome;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Map a delete outcome onto the response: 204, or 403 / 404 errors.
pub fn deleted(outcome: DeleteOutcome, what: &str) -> AppResult<StatusCode> {
    match outcome {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Forbidden => Err(AppError::Forbidden(format!("You do not own this {what}"))),
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!("{what} not found"))),
    }
}
