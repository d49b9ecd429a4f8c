use sqlx::SqlitePool;
use thiserror::Error;

use crate::error::AppError;
use crate::models::entry::LibraryEntry;
use crate::services::auth;

pub const DEFAULT_LINK: &str = "#";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("no such user")]
    UserNotFound,

    #[error(transparent)]
    App(#[from] AppError),
}

pub async fn save_entry(
    pool: &SqlitePool,
    username: &str,
    title: &str,
    content: &str,
    link: Option<&str>,
) -> Result<i64, SaveError> {
    // A valid session implies the user exists, but that is checked, not
    // assumed.
    let user = auth::find_user_by_username(pool, username)
        .await
        .map_err(AppError::from)?
        .ok_or(SaveError::UserNotFound)?;

    let done =
        sqlx::query("INSERT INTO library (user_id, title, content, link) VALUES (?, ?, ?, ?)")
            .bind(user.id)
            .bind(title)
            .bind(content)
            .bind(link.unwrap_or(DEFAULT_LINK))
            .execute(pool)
            .await
            .map_err(AppError::from)?;

    Ok(done.last_insert_rowid())
}

/// Entries owned by `username`, title-ascending under SQLite's BINARY
/// collation (case-sensitive byte order); id breaks ties in insertion
/// order. An unresolvable user yields an empty list, not an error.
pub async fn list_entries(
    pool: &SqlitePool,
    username: &str,
) -> Result<Vec<LibraryEntry>, AppError> {
    let Some(user) = auth::find_user_by_username(pool, username).await? else {
        return Ok(Vec::new());
    };

    let entries = sqlx::query_as::<_, LibraryEntry>(
        "SELECT id, user_id, title, content, link FROM library
         WHERE user_id = ? ORDER BY title ASC, id ASC",
    )
    .bind(user.id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// The ownership check lives in the statement itself: a missing id or an
/// entry owned by someone else matches zero rows and the delete is a
/// silent no-op.
pub async fn delete_entry(
    pool: &SqlitePool,
    username: &str,
    entry_id: i64,
) -> Result<(), AppError> {
    let Some(user) = auth::find_user_by_username(pool, username).await? else {
        return Ok(());
    };

    sqlx::query("DELETE FROM library WHERE id = ? AND user_id = ?")
        .bind(entry_id)
        .bind(user.id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::database;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        database::init_schema(&pool).await.unwrap();
        pool
    }

    // Seeds users directly so these tests skip the bcrypt cost.
    async fn seed_user(pool: &SqlitePool, username: &str) {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, 'x')")
            .bind(username)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn entries_are_scoped_to_their_owner() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;
        seed_user(&pool, "bob").await;

        let alice_entry = save_entry(&pool, "alice", "Rust", "notes", None).await.unwrap();
        save_entry(&pool, "bob", "Go", "other notes", None).await.unwrap();

        let bobs = list_entries(&pool, "bob").await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].title, "Go");

        // Bob deleting Alice's entry is a no-op and her entry survives.
        delete_entry(&pool, "bob", alice_entry).await.unwrap();
        let alices = list_entries(&pool, "alice").await.unwrap();
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].id, alice_entry);
    }

    #[tokio::test]
    async fn listing_uses_case_sensitive_byte_order() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;

        save_entry(&pool, "alice", "Banana", "", None).await.unwrap();
        save_entry(&pool, "alice", "apple", "", None).await.unwrap();
        save_entry(&pool, "alice", "Cherry", "", None).await.unwrap();

        let titles: Vec<String> = list_entries(&pool, "alice")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["Banana", "Cherry", "apple"]);
    }

    #[tokio::test]
    async fn equal_titles_keep_insertion_order() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;

        let first = save_entry(&pool, "alice", "same", "one", None).await.unwrap();
        let second = save_entry(&pool, "alice", "same", "two", None).await.unwrap();

        let ids: Vec<i64> = list_entries(&pool, "alice")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, [first, second]);
    }

    #[tokio::test]
    async fn missing_link_gets_the_placeholder() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;

        save_entry(&pool, "alice", "Rust", "notes", None).await.unwrap();
        save_entry(&pool, "alice", "Sqlx", "notes", Some("https://example.com")).await.unwrap();

        let entries = list_entries(&pool, "alice").await.unwrap();
        assert_eq!(entries[0].link, DEFAULT_LINK);
        assert_eq!(entries[1].link, "https://example.com");
    }

    #[tokio::test]
    async fn unknown_user_is_not_an_error() {
        let pool = test_pool().await;

        let err = save_entry(&pool, "ghost", "t", "c", None).await.unwrap_err();
        assert!(matches!(err, SaveError::UserNotFound));

        assert!(list_entries(&pool, "ghost").await.unwrap().is_empty());
        assert!(delete_entry(&pool, "ghost", 1).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_a_missing_entry_is_a_no_op() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;

        assert!(delete_entry(&pool, "alice", 42).await.is_ok());
    }
}
