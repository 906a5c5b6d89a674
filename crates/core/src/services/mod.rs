//! Business logic services.

#![allow(missing_docs)]

pub mod board;
pub mod cascade;
pub mod comment;
pub mod comment_tree;
pub mod ownership;
pub mod post;
pub mod review;
pub mod view_count;

pub use board::{BoardEntity, BoardService, EntityWithComments};
pub use cascade::{CascadeDeleteCoordinator, DeleteOutcome};
pub use comment::{CommentResponse, CommentService, CommentThread};
pub use comment_tree::{TopLevelComment, assemble};
pub use ownership::{Ownership, OwnershipCheck};
pub use post::{PostResponse, PostService};
pub use review::{ReviewResponse, ReviewService};
pub use view_count::ViewCountAccumulator;
