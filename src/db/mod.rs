//! Database layer.
//!
//! `models` holds the typed records every query maps its rows into, and `services` holds the
//! SQL. The pool is always passed in explicitly; a handler's unit of work is whatever the
//! service function it calls acquires and releases.

use std::str::FromStr;
use std::time::Duration;

use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info};

pub mod models;
pub mod services;

const SCHEMA: &str = include_str!("../../migrations/schema.sql");

const MAX_CONNECTIONS: u32 = 5;

/// Opens a pool for the SQLite file named by `database_url`, creating the file if needed.
/// Foreign-key enforcement is switched on for every connection the pool hands out.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// Single-connection in-memory database with the schema applied.
///
/// The connection never idles out, so the data lives as long as the pool.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Opens a transaction that holds the write lock from its first statement.
///
/// Concurrent writers then queue on the busy timeout. A deferred transaction that reads
/// before writing fails with "database is locked" when two of them try to upgrade at once.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Applies the table definitions. Safe to run against an already initialized database.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Applying database schema...");
    sqlx::raw_sql(SCHEMA).execute(pool).await.map_err(|e| {
        error!("Failed to apply database schema: {}", e);
        e
    })?;
    info!("Database schema is up to date.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        init_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec!["categories", "comments", "match_categories", "matches", "users"]
        );
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let pool = connect_in_memory().await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
