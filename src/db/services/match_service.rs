use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db;
use crate::db::models::{
    Category, CommentWithAuthor, Match, MatchDetail, MatchEditView, MatchFields, MatchPage, MatchSummary,
    MatchWithOwner,
};
use crate::db::services::category_service;
use crate::services::authorization::{MATCH_NOT_FOUND, authorize_match};
use crate::services::validation::validate_match_request;
use crate::web::error::AppError;
use crate::web::models::MatchRequest;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

const SUMMARY_COLUMNS: &str = r#"
    m.id, m.title, m.description, m.date, m.opponent, m.result, m.location,
    m.owner_id, u.username AS owner_username
"#;

// --- Match Service Functions ---

/// Inserts a match row and its category tags on an open connection or transaction.
pub async fn insert_match(
    conn: &mut SqliteConnection,
    owner_id: i64,
    fields: &MatchFields,
    category_ids: &[i64],
) -> Result<Match, sqlx::Error> {
    let now = Utc::now();
    let new_match = sqlx::query_as::<_, Match>(
        r#"
        INSERT INTO matches (title, description, date, opponent, result, location,
                             custom_category, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.date)
    .bind(&fields.opponent)
    .bind(&fields.result)
    .bind(&fields.location)
    .bind(&fields.custom_category)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    category_service::insert_match_categories(conn, new_match.id, category_ids).await?;
    Ok(new_match)
}

/// Creates a match owned by `owner_id`, tagged with the requested categories.
/// The row and its tags are committed together or not at all.
pub async fn create_match(
    pool: &SqlitePool,
    owner_id: i64,
    req: &MatchRequest,
) -> Result<Match, AppError> {
    let fields = validate_match_request(req)?;

    let mut tx = db::begin_write(pool).await?;
    let new_match = insert_match(&mut tx, owner_id, &fields, &req.categories).await?;
    tx.commit().await?;

    info!(match_id = new_match.id, owner_id, "Match created.");
    Ok(new_match)
}

/// Retrieves a match by its ID.
pub async fn get_match_by_id(pool: &SqlitePool, match_id: i64) -> Result<Option<Match>, AppError> {
    let found = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(pool)
        .await?;
    Ok(found)
}

async fn fetch_owner_id(
    conn: &mut SqliteConnection,
    match_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT owner_id FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Match with owner name, category names and the comment thread, oldest comment first.
pub async fn get_match_detail(pool: &SqlitePool, match_id: i64) -> Result<MatchDetail, AppError> {
    let mut conn = pool.acquire().await?;

    let match_info = sqlx::query_as::<_, MatchWithOwner>(
        r#"
        SELECT m.*, u.username AS owner_username
        FROM matches m
        JOIN users u ON m.owner_id = u.id
        WHERE m.id = ?
        "#,
    )
    .bind(match_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(MATCH_NOT_FOUND.to_string()))?;

    let categories = category_service::get_categories_for_match(&mut conn, match_id).await?;

    let comments = sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.match_id, c.user_id, u.username, c.content, c.created_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.match_id = ?
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(match_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(MatchDetail {
        match_info,
        categories,
        comments,
    })
}

/// Edit form data. Only the owner may see it.
pub async fn get_match_for_edit(
    pool: &SqlitePool,
    actor_id: i64,
    match_id: i64,
) -> Result<MatchEditView, AppError> {
    let mut conn = pool.acquire().await?;

    let found = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await?;
    authorize_match(actor_id, match_id, found.as_ref().map(|m| m.owner_id))?;
    let match_info = found.ok_or_else(|| AppError::NotFound(MATCH_NOT_FOUND.to_string()))?;

    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;
    let selected_category_ids =
        category_service::get_category_ids_for_match(&mut conn, match_id).await?;

    Ok(MatchEditView {
        match_info,
        categories,
        selected_category_ids,
    })
}

/// Replaces every field of a match and re-tags it in one transaction.
///
/// Checks run in the order existence, ownership, input validation. Any failure, including
/// an unknown category id, rolls back the row update and the tag replacement together.
pub async fn update_match(
    pool: &SqlitePool,
    actor_id: i64,
    match_id: i64,
    req: &MatchRequest,
) -> Result<Match, AppError> {
    let mut tx = db::begin_write(pool).await?;

    let owner_id = fetch_owner_id(&mut tx, match_id).await?;
    authorize_match(actor_id, match_id, owner_id)?;
    let fields = validate_match_request(req)?;

    let now = Utc::now();
    let updated = sqlx::query_as::<_, Match>(
        r#"
        UPDATE matches
        SET title = ?, description = ?, date = ?, opponent = ?, result = ?, location = ?,
            custom_category = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.date)
    .bind(&fields.opponent)
    .bind(&fields.result)
    .bind(&fields.location)
    .bind(&fields.custom_category)
    .bind(now)
    .bind(match_id)
    .fetch_one(&mut *tx)
    .await?;

    category_service::replace_match_categories(&mut tx, match_id, &req.categories).await?;

    tx.commit().await?;
    info!(match_id, actor_id, "Match updated.");
    Ok(updated)
}

/// Deletes a match. Its tags and comments go with it through ON DELETE CASCADE.
pub async fn delete_match(pool: &SqlitePool, actor_id: i64, match_id: i64) -> Result<(), AppError> {
    let mut tx = db::begin_write(pool).await?;

    let owner_id = fetch_owner_id(&mut tx, match_id).await?;
    authorize_match(actor_id, match_id, owner_id)?;

    sqlx::query("DELETE FROM matches WHERE id = ?")
        .bind(match_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(match_id, actor_id, "Match deleted.");
    Ok(())
}

/// Escapes LIKE wildcards so the search text matches literally, then wraps it for a
/// substring match. Pairs with `ESCAPE '\'` in the query.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

/// One page of the match listing, newest match date first.
///
/// `search` filters title and description by case-insensitive substring; blank means no
/// filter. Case folding is ASCII-only (SQLite `LIKE`): "hjk" finds "HJK" but "ä" does not
/// find "Ä". Pages are 1-based and anything below 1 is treated as 1. A page past the end
/// is empty rather than an error.
pub async fn list_matches(
    pool: &SqlitePool,
    search: Option<&str>,
    page: i64,
    page_size: i64,
) -> Result<MatchPage, AppError> {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(page_size);
    let q = search.map(str::trim).filter(|q| !q.is_empty());

    let mut conn = pool.acquire().await?;

    let (matches, total) = match q {
        Some(q) => {
            let pattern = like_pattern(q);
            let matches = sqlx::query_as::<_, MatchSummary>(&format!(
                r#"
                SELECT {SUMMARY_COLUMNS}
                FROM matches m
                JOIN users u ON m.owner_id = u.id
                WHERE m.title LIKE ? ESCAPE '\' OR m.description LIKE ? ESCAPE '\'
                ORDER BY m.date DESC, m.id DESC
                LIMIT ? OFFSET ?
                "#
            ))
            .bind(&pattern)
            .bind(&pattern)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await?;

            let total: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM matches
                WHERE title LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\'
                "#,
            )
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&mut *conn)
            .await?;
            (matches, total)
        }
        None => {
            let matches = sqlx::query_as::<_, MatchSummary>(&format!(
                r#"
                SELECT {SUMMARY_COLUMNS}
                FROM matches m
                JOIN users u ON m.owner_id = u.id
                ORDER BY m.date DESC, m.id DESC
                LIMIT ? OFFSET ?
                "#
            ))
            .bind(page_size)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
                .fetch_one(&mut *conn)
                .await?;
            (matches, total)
        }
    };

    debug!(page, total, returned = matches.len(), "Listed matches.");
    Ok(MatchPage {
        matches,
        q: q.map(str::to_string),
        page,
        page_size,
        total,
        total_pages: total_pages(total, page_size),
    })
}

pub async fn count_matches(pool: &SqlitePool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
