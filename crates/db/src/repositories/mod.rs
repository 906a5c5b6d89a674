//! Repositories.
//!
//! Each repository wraps the shared connection pool. Methods suffixed `_in`
//! are associated functions that run on any connection or open transaction
//! so that callers can compose them atomically.

#![allow(missing_docs)]

pub mod comment;
pub mod post;
pub mod review;
pub mod user;

pub use comment::{CommentRepository, ParentCommentCount};
pub use post::PostRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;
