use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::db;
use crate::db::models::Comment;
use crate::services::authorization::MATCH_NOT_FOUND;
use crate::services::validation::validate_comment;
use crate::web::error::AppError;

// --- Comment Service Functions ---

/// Inserts a comment row on an open connection or transaction, stamped with the current time.
pub async fn insert_comment(
    conn: &mut SqliteConnection,
    match_id: i64,
    user_id: i64,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (match_id, user_id, content, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, match_id, user_id, content, created_at
        "#,
    )
    .bind(match_id)
    .bind(user_id)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
}

/// Adds a comment by `user_id` to an existing match. Any authenticated user may comment.
///
/// The match must exist before the content is looked at, so an empty comment on a missing
/// match reports "not found" like every other match operation.
pub async fn add_comment(
    pool: &SqlitePool,
    user_id: i64,
    match_id: i64,
    content: &str,
) -> Result<Comment, AppError> {
    let mut tx = db::begin_write(pool).await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(MATCH_NOT_FOUND.to_string()));
    }

    let content = validate_comment(content)?;

    let comment = insert_comment(&mut tx, match_id, user_id, &content).await?;

    tx.commit().await?;
    info!(comment_id = comment.id, match_id, user_id, "Comment added.");
    Ok(comment)
}
