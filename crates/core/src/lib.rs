//! Core business logic for SnowShare.
//!
//! The transactional consistency layer of the board lives here: ownership
//! checks, cascade deletion, comment tree assembly and view counting, plus
//! the post, review and comment services built on them.

pub mod services;

pub use services::*;
