//! Database setup and initialization.
//!
//! Entry points call [`setup_database`] with the resolved database path.

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
#[cfg(any(test, feature = "test-utils"))]
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;

/// Open (creating if missing) the `SQLite` database and ensure the schema exists.
///
/// # Example
///
/// ```rust,no_run
/// use copilot_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(Path::new("/path/to/copilot.db")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    create_schema(&pool).await?;
    tracing::debug!(path = %db_path.display(), "Database ready");
    Ok(pool)
}

/// In-memory database with the production schema.
///
/// A single connection keeps every query on the same in-memory database.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the schema. Safe to call repeatedly.
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS storage_kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn setup_creates_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("copilot.db");

        let pool = setup_database(&path).await.unwrap();
        assert!(path.exists());
        create_schema(&pool).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storage_kv")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
