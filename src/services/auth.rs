use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::error::AppError;
use crate::models::user::User;

#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("username already taken")]
    DuplicateUsername,

    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    App(#[from] AppError),
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Creates a user with a bcrypt-hashed password. The UNIQUE constraint on
/// username doubles as the existence check: a separate SELECT would race
/// against a concurrent registration.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, RegisterError> {
    let password_hash = hash(password, DEFAULT_COST).map_err(AppError::from)?;

    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(&password_hash)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
            password_hash,
        }),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(RegisterError::DuplicateUsername)
        }
        Err(e) => Err(AppError::from(e).into()),
    }
}

/// Unknown username and wrong password collapse into the same
/// `InvalidCredentials` variant so the two cases are indistinguishable to
/// the caller.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = find_user_by_username(pool, username)
        .await
        .map_err(AppError::from)?
        .ok_or(AuthError::InvalidCredentials)?;

    match verify(password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) => Err(AuthError::InvalidCredentials),
        Err(e) => Err(AuthError::App(e.into())),
    }
}

pub async fn list_usernames(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT username FROM users")
        .fetch_all(pool)
        .await
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

    #[tokio::test]
    async fn register_then_authenticate() {
        let pool = test_pool().await;
        let created = create_user(&pool, "alice", "hunter2").await.unwrap();
        let user = authenticate(&pool, "alice", "hunter2").await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_username_rejected_without_mutation() {
        let pool = test_pool().await;
        let first = create_user(&pool, "alice", "hunter2").await.unwrap();

        let err = create_user(&pool, "alice", "other").await.unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateUsername));

        let stored = find_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.password_hash, first.password_hash);
        assert!(authenticate(&pool, "alice", "hunter2").await.is_ok());
    }

    #[tokio::test]
    async fn bad_password_and_unknown_user_look_identical() {
        let pool = test_pool().await;
        create_user(&pool, "alice", "hunter2").await.unwrap();

        let wrong_password = authenticate(&pool, "alice", "nope").await.unwrap_err();
        let unknown_user = authenticate(&pool, "bob", "hunter2").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn plaintext_is_never_stored() {
        let pool = test_pool().await;
        create_user(&pool, "alice", "hunter2").await.unwrap();

        let stored = find_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "hunter2");
        assert!(stored.password_hash.starts_with("$2"));
    }
}
