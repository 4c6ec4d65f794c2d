use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::{MatchSummary, User, UserProfile};
use crate::web::error::AppError;

// --- User Service Functions ---

/// Creates a new user. A duplicate username surfaces as a conflict and nothing is inserted.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    let now = Utc::now();
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, created_at)
        VALUES (?, ?, ?)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::UserAlreadyExists("Username already taken".to_string()),
        other => other,
    })
}

/// Retrieves a user by their ID.
pub async fn get_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Retrieves a user by their username.
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Public profile: the user plus every match they own, newest match date first.
pub async fn get_user_profile(pool: &SqlitePool, user_id: i64) -> Result<UserProfile, AppError> {
    let mut conn = pool.acquire().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let matches = sqlx::query_as::<_, MatchSummary>(
        r#"
        SELECT m.id, m.title, m.description, m.date, m.opponent, m.result, m.location,
               m.owner_id, u.username AS owner_username
        FROM matches m
        JOIN users u ON m.owner_id = u.id
        WHERE m.owner_id = ?
        ORDER BY m.date DESC, m.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(UserProfile {
        id: user.id,
        username: user.username,
        match_count: matches.len() as i64,
        matches,
    })
}
