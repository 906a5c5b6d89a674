//! Two-level comment tree assembly.

use std::collections::HashMap;

use snowshare_db::entities::comment;

/// A top-level comment with its direct replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelComment<T = comment::Model> {
    /// The top-level comment.
    pub comment: T,
    /// Direct replies, oldest first.
    pub replies: Vec<T>,
}

/// Minimal view of a comment row needed for grouping.
pub trait ThreadedComment {
    /// Row ID.
    fn id(&self) -> &str;
    /// Top-level comment this row replies to, if any.
    fn parent_comment_id(&self) -> Option<&str>;
}

impl ThreadedComment for comment::Model {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_comment_id(&self) -> Option<&str> {
        self.parent_comment_id.as_deref()
    }
}

/// Group a flat, already ordered comment list into a two-level tree.
///
/// Top-level comments and each reply list keep the input order. Replies
/// whose parent is not a top-level comment in `rows` are dropped.
#[must_use]
pub fn assemble<T: ThreadedComment>(rows: Vec<T>) -> Vec<TopLevelComment<T>> {
    let mut top_level = Vec::new();
    let mut replies: HashMap<String, Vec<T>> = HashMap::new();

    for row in rows {
        match row.parent_comment_id() {
            None => top_level.push(row),
            Some(parent) => replies.entry(parent.to_string()).or_default().push(row),
        }
    }

    let tree: Vec<TopLevelComment<T>> = top_level
        .into_iter()
        .map(|comment| {
            let replies = replies.remove(comment.id()).unwrap_or_default();
            TopLevelComment { comment, replies }
        })
        .collect();

    if !replies.is_empty() {
        let dropped: usize = replies.values().map(Vec::len).sum();
        tracing::debug!(dropped, "Dropped replies without a top-level parent");
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: String,
        parent: Option<String>,
    }

    impl ThreadedComment for Row {
        fn id(&self) -> &str {
            &self.id
        }

        fn parent_comment_id(&self) -> Option<&str> {
            self.parent.as_deref()
        }
    }

    fn row(id: u32, parent: Option<u32>) -> Row {
        Row {
            id: id.to_string(),
            parent: parent.map(|p| p.to_string()),
        }
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_assemble_groups_and_drops_dangling() {
        let rows = vec![
            row(1, None),
            row(2, None),
            row(3, Some(1)),
            row(4, Some(1)),
            row(5, Some(99)),
        ];

        let tree = assemble(rows);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, "1");
        assert_eq!(ids(&tree[0].replies), vec!["3", "4"]);
        assert_eq!(tree[1].comment.id, "2");
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn test_assemble_empty() {
        assert!(assemble(Vec::<Row>::new()).is_empty());
    }

    #[test]
    fn test_reply_before_parent_in_input_still_attaches() {
        let tree = assemble(vec![row(3, Some(1)), row(1, None)]);

        assert_eq!(tree.len(), 1);
        assert_eq!(ids(&tree[0].replies), vec!["3"]);
    }

    #[test]
    fn test_reply_to_reply_is_dropped() {
        let tree = assemble(vec![row(1, None), row(2, Some(1)), row(3, Some(2))]);

        assert_eq!(tree.len(), 1);
        assert_eq!(ids(&tree[0].replies), vec!["2"]);
    }
}
