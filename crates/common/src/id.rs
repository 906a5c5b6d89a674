//! ID generation utilities.

use ulid::Ulid;

/// ID generator for board rows (users, posts, reviews, comments).
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// Lowercased ULIDs sort by their millisecond timestamp. Ids minted in
    /// the same millisecond compare by their random part, so they give a
    /// stable order but not insertion order.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}
