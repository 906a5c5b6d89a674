//! Database integration tests.
//!
//! The PostgreSQL tests require a running instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `snowshare_test`)
//!   `TEST_DB_PASSWORD` (default: `snowshare_test`)
//!   `TEST_DB_NAME` (default: `snowshare_test`)
//!
//! The remaining tests run against in-memory SQLite.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Set, TransactionTrait};
use snowshare_db::entities::{ParentKind, comment, post};
use snowshare_db::repositories::{CommentRepository, PostRepository};
use snowshare_db::test_utils::{TestDatabase, TestDbConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_execute_query() {
    let db = TestDatabase::new().await.expect("Failed to connect");

    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await;

    assert!(result.is_ok(), "Query failed: {:?}", result.err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(config.database_url().starts_with("postgres://"));
}

async fn insert_post(repo: &PostRepository, id: &str, user_id: &str) -> post::Model {
    repo.create(post::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        title: Set("Salt delivery".to_string()),
        content: Set("Truck came by at 6am".to_string()),
        view_count: Set(0),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap()
}

async fn insert_comment(
    repo: &CommentRepository,
    id: &str,
    parent_id: &str,
    reply_to: Option<&str>,
    age_secs: i64,
) -> comment::Model {
    repo.create(comment::ActiveModel {
        id: Set(id.to_string()),
        parent_id: Set(parent_id.to_string()),
        parent_kind: Set(ParentKind::Post),
        user_id: Set("u1".to_string()),
        content: Set(format!("comment {id}")),
        parent_comment_id: Set(reply_to.map(ToString::to_string)),
        created_at: Set((Utc::now() - Duration::seconds(age_secs)).into()),
        updated_at: Set(None),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_find_by_parent_orders_oldest_first() {
    let db = TestDatabase::in_memory().await.unwrap();
    db.seed_user("u1", "alice").await.unwrap();

    let posts = PostRepository::new(db.shared());
    let comments = CommentRepository::new(db.shared());
    insert_post(&posts, "p1", "u1").await;

    insert_comment(&comments, "c2", "p1", None, 100).await;
    insert_comment(&comments, "c1", "p1", None, 300).await;
    insert_comment(&comments, "c3", "p1", Some("c1"), 200).await;

    let rows = comments.find_by_parent(ParentKind::Post, "p1").await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(ids, vec!["c1", "c3", "c2"]);
}

#[tokio::test]
async fn test_find_by_parent_breaks_timestamp_ties_by_id() {
    let db = TestDatabase::in_memory().await.unwrap();
    db.seed_user("u1", "alice").await.unwrap();

    let posts = PostRepository::new(db.shared());
    let comments = CommentRepository::new(db.shared());
    insert_post(&posts, "p1", "u1").await;

    let at = Utc::now() - Duration::seconds(60);
    for id in ["c9", "c5", "c7"] {
        comments
            .create(comment::ActiveModel {
                id: Set(id.to_string()),
                parent_id: Set("p1".to_string()),
                parent_kind: Set(ParentKind::Post),
                user_id: Set("u1".to_string()),
                content: Set(format!("comment {id}")),
                parent_comment_id: Set(None),
                created_at: Set(at.into()),
                updated_at: Set(None),
            })
            .await
            .unwrap();
    }

    let rows = comments.find_by_parent(ParentKind::Post, "p1").await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(ids, vec!["c5", "c7", "c9"]);
}

#[tokio::test]
async fn test_owner_filtered_writes() {
    let db = TestDatabase::in_memory().await.unwrap();
    db.seed_user("u1", "alice").await.unwrap();

    let posts = PostRepository::new(db.shared());
    insert_post(&posts, "p1", "u1").await;

    assert_eq!(posts.update_owned("p1", "u2", "x", "y").await.unwrap(), 0);
    assert_eq!(posts.update_owned("p1", "u1", "x", "y").await.unwrap(), 1);
    assert_eq!(posts.increment_view_count("p1").await.unwrap(), 1);

    let post = posts.get_by_id("p1").await.unwrap();
    assert_eq!(post.title, "x");
    assert_eq!(post.view_count, 1);
    assert!(post.updated_at.is_some());

    assert_eq!(
        PostRepository::delete_owned_in(db.connection(), "p1", "u2")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let db = TestDatabase::in_memory().await.unwrap();
    db.seed_user("u1", "alice").await.unwrap();

    let posts = PostRepository::new(db.shared());
    let comments = CommentRepository::new(db.shared());
    insert_post(&posts, "p1", "u1").await;
    insert_comment(&comments, "c1", "p1", None, 0).await;

    {
        let txn = db.connection().begin().await.unwrap();
        let removed = CommentRepository::delete_by_parent_in(&txn, ParentKind::Post, "p1")
            .await
            .unwrap();
        assert_eq!(removed, 1);
        // Dropped without commit.
    }

    assert_eq!(
        comments
            .find_by_parent(ParentKind::Post, "p1")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_count_by_parents_groups_rows() {
    let db = TestDatabase::in_memory().await.unwrap();
    db.seed_user("u1", "alice").await.unwrap();

    let posts = PostRepository::new(db.shared());
    let comments = CommentRepository::new(db.shared());
    insert_post(&posts, "p1", "u1").await;
    insert_post(&posts, "p2", "u1").await;
    insert_comment(&comments, "c1", "p1", None, 0).await;
    insert_comment(&comments, "c2", "p1", Some("c1"), 0).await;

    let counts = comments
        .count_by_parents(ParentKind::Post, &["p1".to_string(), "p2".to_string()])
        .await
        .unwrap();

    assert_eq!(counts.get("p1"), Some(&2));
    assert_eq!(counts.get("p2"), None);
}
