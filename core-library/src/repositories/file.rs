//! File (document) repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Document, NewDocument};
use async_trait::async_trait;
use sqlx::{query, query_as, QueryBuilder, Sqlite, SqlitePool};

/// File repository interface for data access operations
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Find a document by its local ID
    ///
    /// # Returns
    /// - `Ok(Some(document))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn get(&self, id: i64) -> Result<Option<Document>>;

    /// Find a document by its Universer unit ID
    async fn get_by_unit_id(&self, unit_id: &str) -> Result<Option<Document>>;

    /// Fetch every document whose ID is in `ids`, ordered by ID.
    /// Unknown IDs are skipped.
    async fn batch_get(&self, ids: &[i64]) -> Result<Vec<Document>>;

    /// Insert a new document and return it with its assigned ID
    ///
    /// # Errors
    /// Returns error if:
    /// - Validation fails
    /// - A document with the same unit ID already exists
    /// - Database error occurs
    async fn create(&self, document: &NewDocument) -> Result<Document>;

    /// Delete documents by ID
    ///
    /// # Returns
    /// Number of rows removed
    async fn batch_delete(&self, ids: &[i64]) -> Result<u64>;
}

/// SQLite implementation of FileRepository
pub struct SqliteFileRepository {
    pool: SqlitePool,
}

impl SqliteFileRepository {
    /// Create a new SqliteFileRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for SqliteFileRepository {
    async fn get(&self, id: i64) -> Result<Option<Document>> {
        let document = query_as::<_, Document>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    async fn get_by_unit_id(&self, unit_id: &str) -> Result<Option<Document>> {
        let document = query_as::<_, Document>("SELECT * FROM files WHERE unit_id = ?")
            .bind(unit_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    async fn batch_get(&self, ids: &[i64]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM files WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let documents = builder
            .build_query_as::<Document>()
            .fetch_all(&self.pool)
            .await?;

        Ok(documents)
    }

    async fn create(&self, document: &NewDocument) -> Result<Document> {
        document
            .validate()
            .map_err(|e| LibraryError::InvalidInput {
                field: "Document".to_string(),
                message: e,
            })?;

        let now = chrono::Utc::now().timestamp();

        let result = query(
            r#"
            INSERT INTO files (name, unit_id, unit_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document.name)
        .bind(&document.unit_id)
        .bind(document.unit_type)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Document {
            id: result.last_insert_rowid(),
            name: document.name.clone(),
            unit_id: document.unit_id.clone(),
            unit_type: document.unit_type,
            created_at: now,
            updated_at: now,
        })
    }

    async fn batch_delete(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM files WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
