//! # Document Store Connection Pool
//!
//! Opens the SQLite database behind the gateway's two tables, `files` and
//! `file_collaborators`, and applies the embedded migrations.
//!
//! Every connection runs in WAL mode with foreign keys enforced, since removing
//! a document relies on `ON DELETE CASCADE` to drop its collaborator rows.
//!
//! ```rust,ignore
//! use core_library::db::{create_pool, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new("gateway.db").max_connections(8)).await?;
//! let files = SqliteFileRepository::new(pool.clone());
//! ```
//!
//! Tests use [`create_test_pool`], a migrated in-memory database.

use crate::{LibraryError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a caller waits for a free pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Database configuration for the document store pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `sqlite:<path>` or `sqlite::memory:`
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// File-backed store, created on first use.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_url: format!("sqlite:{}", database_path.into().display()),
            max_connections: 5,
        }
    }

    /// Private in-memory store.
    ///
    /// Each SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    /// Set the maximum number of connections. Ignored for in-memory stores.
    pub fn max_connections(mut self, max: u32) -> Self {
        if !self.is_in_memory() {
            self.max_connections = max;
        }
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url == "sqlite::memory:"
    }
}

/// Open the pool, run migrations and check that the store answers.
pub async fn create_pool(config: DatabaseConfig) -> Result<Pool<Sqlite>> {
    info!(
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "Opening document store"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(LibraryError::Database)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);

    let mut pool_options = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT);
    if config.is_in_memory() {
        pool_options = pool_options.max_lifetime(None).idle_timeout(None);
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to open document store");
            LibraryError::Database(e)
        })?;

    run_migrations(&pool).await?;
    health_check(&pool).await?;

    info!(connections = pool.size(), "Document store ready");
    Ok(pool)
}

/// Migrated in-memory pool for tests.
pub async fn create_test_pool() -> Result<Pool<Sqlite>> {
    create_pool(DatabaseConfig::in_memory()).await
}

async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    debug!("Running document store migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Migration failed");
            LibraryError::Migration(e.to_string())
        })?;

    Ok(())
}

async fn health_check(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Document store health check failed");
        LibraryError::Database(e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_connections_applies_to_file_store_only() {
        let file = DatabaseConfig::new("/tmp/gateway.db").max_connections(8);
        assert_eq!(file.database_url, "sqlite:/tmp/gateway.db");
        assert_eq!(file.max_connections, 8);

        let memory = DatabaseConfig::in_memory().max_connections(8);
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
    }

    #[tokio::test]
    async fn test_pool_honours_max_connections() {
        let path = std::env::temp_dir().join(format!("usip-db-{}.db", std::process::id()));
        let pool = create_pool(DatabaseConfig::new(&path).max_connections(3))
            .await
            .unwrap();

        assert_eq!(pool.options().get_max_connections(), 3);
        let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.0.to_lowercase(), "wal");

        pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let pool = create_test_pool().await.unwrap();
        assert!(health_check(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_test_pool().await.unwrap();

        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(result.0, 1, "Foreign keys should be enabled");
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let pool = create_test_pool().await.unwrap();

        for table in ["files", "file_collaborators"] {
            let result: (i32,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();

            assert_eq!(result.0, 1, "{} table should exist", table);
        }
    }

    #[tokio::test]
    async fn test_deleting_file_cascades_to_collaborators() {
        let pool = create_test_pool().await.unwrap();

        sqlx::query(
            "INSERT INTO files (name, unit_id, unit_type, created_at, updated_at) VALUES ('a', 'u-1', 1, 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO file_collaborators (file_id, user_id, role) \
             SELECT id, '1', 'owner' FROM files WHERE unit_id = 'u-1'",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM files").execute(&pool).await.unwrap();

        // second acquire sees the writes of the first
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_collaborators")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
