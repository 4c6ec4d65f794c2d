use std::collections::BTreeSet;

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::Category;
use crate::web::error::AppError;

// --- Category Service Functions ---

pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

/// Creates a category. Names are unique; a duplicate is reported as a conflict.
pub async fn create_category(pool: &SqlitePool, name: &str) -> Result<Category, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Category name is required".to_string()));
    }
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name) VALUES (?) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(category)
}

pub async fn get_category_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<Category>, AppError> {
    let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Retrieves all categories a match is tagged with, sorted by name.
pub async fn get_categories_for_match(
    conn: &mut SqliteConnection,
    match_id: i64,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.name
        FROM categories c
        INNER JOIN match_categories mc ON c.id = mc.category_id
        WHERE mc.match_id = ?
        ORDER BY c.name
        "#,
    )
    .bind(match_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn get_category_ids_for_match(
    conn: &mut SqliteConnection,
    match_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT category_id FROM match_categories WHERE match_id = ? ORDER BY category_id",
    )
    .bind(match_id)
    .fetch_all(&mut *conn)
    .await
}

/// Tags a match with each category in `category_ids`. Repeated ids collapse to one row.
/// An id with no category row fails the foreign key and aborts the caller's transaction.
pub async fn insert_match_categories(
    conn: &mut SqliteConnection,
    match_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    let unique_ids: BTreeSet<i64> = category_ids.iter().copied().collect();
    for category_id in unique_ids {
        sqlx::query("INSERT INTO match_categories (match_id, category_id) VALUES (?, ?)")
            .bind(match_id)
            .bind(category_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Full set replacement of a match's categories. Must run inside the same transaction as
/// the match row update so the two commit or roll back together.
pub async fn replace_match_categories(
    conn: &mut SqliteConnection,
    match_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM match_categories WHERE match_id = ?")
        .bind(match_id)
        .execute(&mut *conn)
        .await?;
    insert_match_categories(conn, match_id, category_ids).await
}
