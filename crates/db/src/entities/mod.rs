//! Database entities.

pub mod comment;
pub mod post;
pub mod review;
pub mod user;

pub use comment::{Entity as Comment, ParentKind};
pub use post::Entity as Post;
pub use review::Entity as Review;
pub use user::Entity as User;
