//! Collaborator repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Collaborator, NewCollaborator};
use async_trait::async_trait;
use sqlx::{query, query_as, QueryBuilder, Sqlite, SqlitePool};

/// Collaborator repository interface for data access operations
#[async_trait]
pub trait CollaboratorRepository: Send + Sync {
    /// Find the collaborator row for one user on one document
    async fn get(&self, file_id: i64, user_id: &str) -> Result<Option<Collaborator>>;

    /// All documents a user collaborates on
    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<Collaborator>>;

    /// All collaborators of a document
    async fn get_by_file_id(&self, file_id: i64) -> Result<Vec<Collaborator>>;

    /// Insert a new collaborator row
    ///
    /// # Errors
    /// Returns error if the (file, user) pair already has a role
    async fn create(&self, collaborator: &NewCollaborator) -> Result<Collaborator>;

    /// Insert each assignment, replacing the role of an existing
    /// (file, user) pair. Runs in a single transaction.
    async fn insert_or_update(&self, collaborators: &[NewCollaborator]) -> Result<()>;

    /// Remove the user's rows for the given documents
    ///
    /// # Returns
    /// Number of rows removed
    async fn batch_delete(&self, user_id: &str, file_ids: &[i64]) -> Result<u64>;
}

/// SQLite implementation of CollaboratorRepository
pub struct SqliteCollaboratorRepository {
    pool: SqlitePool,
}

impl SqliteCollaboratorRepository {
    /// Create a new SqliteCollaboratorRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn validate(collaborator: &NewCollaborator) -> Result<()> {
    collaborator
        .validate()
        .map_err(|e| LibraryError::InvalidInput {
            field: "Collaborator".to_string(),
            message: e,
        })
}

#[async_trait]
impl CollaboratorRepository for SqliteCollaboratorRepository {
    async fn get(&self, file_id: i64, user_id: &str) -> Result<Option<Collaborator>> {
        let collaborator = query_as::<_, Collaborator>(
            "SELECT * FROM file_collaborators WHERE file_id = ? AND user_id = ?",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collaborator)
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<Collaborator>> {
        let collaborators = query_as::<_, Collaborator>(
            "SELECT * FROM file_collaborators WHERE user_id = ? ORDER BY file_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(collaborators)
    }

    async fn get_by_file_id(&self, file_id: i64) -> Result<Vec<Collaborator>> {
        let collaborators = query_as::<_, Collaborator>(
            "SELECT * FROM file_collaborators WHERE file_id = ? ORDER BY id",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(collaborators)
    }

    async fn create(&self, collaborator: &NewCollaborator) -> Result<Collaborator> {
        validate(collaborator)?;

        let result = query(
            r#"
            INSERT INTO file_collaborators (file_id, user_id, role)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(collaborator.file_id)
        .bind(&collaborator.user_id)
        .bind(collaborator.role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(Collaborator {
            id: result.last_insert_rowid(),
            file_id: collaborator.file_id,
            user_id: collaborator.user_id.clone(),
            role: collaborator.role.as_str().to_string(),
        })
    }

    async fn insert_or_update(&self, collaborators: &[NewCollaborator]) -> Result<()> {
        if collaborators.is_empty() {
            return Ok(());
        }

        for collaborator in collaborators {
            validate(collaborator)?;
        }

        let mut tx = self.pool.begin().await?;

        for collaborator in collaborators {
            query(
                r#"
                INSERT INTO file_collaborators (file_id, user_id, role)
                VALUES (?, ?, ?)
                ON CONFLICT(file_id, user_id) DO UPDATE SET role = excluded.role
                "#,
            )
            .bind(collaborator.file_id)
            .bind(&collaborator.user_id)
            .bind(collaborator.role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn batch_delete(&self, user_id: &str, file_ids: &[i64]) -> Result<u64> {
        if file_ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM file_collaborators WHERE user_id = ");
        builder.push_bind(user_id);
        builder.push(" AND file_id IN (");
        let mut separated = builder.separated(", ");
        for id in file_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::NewDocument;
    use crate::repositories::file::{FileRepository, SqliteFileRepository};
    use crate::role::Role;

    async fn setup() -> (SqliteFileRepository, SqliteCollaboratorRepository) {
        let pool = create_test_pool().await.unwrap();
        (
            SqliteFileRepository::new(pool.clone()),
            SqliteCollaboratorRepository::new(pool),
        )
    }

    async fn create_file(files: &SqliteFileRepository, unit_id: &str) -> i64 {
        files
            .create(&NewDocument::new("Doc", unit_id, 1))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (files, repo) = setup().await;
        let file_id = create_file(&files, "u-1").await;

        let created = repo
            .create(&NewCollaborator::new(file_id, "1", Role::Owner))
            .await
            .unwrap();
        assert_eq!(created.role, "owner");

        let found = repo.get(file_id, "1").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.role(), Some(Role::Owner));

        assert!(repo.get(file_id, "2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_pair_fails() {
        let (files, repo) = setup().await;
        let file_id = create_file(&files, "u-1").await;

        repo.create(&NewCollaborator::new(file_id, "1", Role::Owner))
            .await
            .unwrap();
        let duplicate = repo
            .create(&NewCollaborator::new(file_id, "1", Role::Reader))
            .await;

        assert!(matches!(duplicate, Err(LibraryError::Database(_))));
    }

    #[tokio::test]
    async fn test_insert_or_update_replaces_role() {
        let (files, repo) = setup().await;
        let file_id = create_file(&files, "u-1").await;

        repo.insert_or_update(&[NewCollaborator::new(file_id, "2", Role::Editor)])
            .await
            .unwrap();
        repo.insert_or_update(&[NewCollaborator::new(file_id, "2", Role::Reader)])
            .await
            .unwrap();

        let rows = repo.get_by_file_id(file_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "2");
        assert_eq!(rows[0].role, "reader");
    }

    #[tokio::test]
    async fn test_insert_or_update_many_users() {
        let (files, repo) = setup().await;
        let file_id = create_file(&files, "u-1").await;

        repo.insert_or_update(&[
            NewCollaborator::new(file_id, "2", Role::Editor),
            NewCollaborator::new(file_id, "3", Role::Reader),
        ])
        .await
        .unwrap();

        let rows = repo.get_by_file_id(file_id).await.unwrap();
        let users: Vec<&str> = rows.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(users, vec!["2", "3"]);

        repo.insert_or_update(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_or_update_is_atomic() {
        let (files, repo) = setup().await;
        let file_id = create_file(&files, "u-1").await;

        // The second row references a missing file and violates the foreign key.
        let result = repo
            .insert_or_update(&[
                NewCollaborator::new(file_id, "2", Role::Editor),
                NewCollaborator::new(file_id + 100, "3", Role::Reader),
            ])
            .await;

        assert!(result.is_err());
        assert!(repo.get_by_file_id(file_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_user_id() {
        let (files, repo) = setup().await;
        let a = create_file(&files, "u-a").await;
        let b = create_file(&files, "u-b").await;

        repo.create(&NewCollaborator::new(a, "1", Role::Owner))
            .await
            .unwrap();
        repo.create(&NewCollaborator::new(b, "1", Role::Reader))
            .await
            .unwrap();
        repo.create(&NewCollaborator::new(b, "2", Role::Owner))
            .await
            .unwrap();

        let rows = repo.get_by_user_id("1").await.unwrap();
        let file_ids: Vec<i64> = rows.iter().map(|c| c.file_id).collect();
        assert_eq!(file_ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_batch_delete_only_touches_user() {
        let (files, repo) = setup().await;
        let a = create_file(&files, "u-a").await;
        let b = create_file(&files, "u-b").await;

        repo.insert_or_update(&[
            NewCollaborator::new(a, "1", Role::Owner),
            NewCollaborator::new(b, "1", Role::Owner),
            NewCollaborator::new(a, "2", Role::Editor),
        ])
        .await
        .unwrap();

        let removed = repo.batch_delete("1", &[a, b]).await.unwrap();
        assert_eq!(removed, 2);

        assert!(repo.get_by_user_id("1").await.unwrap().is_empty());
        assert!(repo.get(a, "2").await.unwrap().is_some());
        assert_eq!(repo.batch_delete("1", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_stored_role_reads_back() {
        let pool = create_test_pool().await.unwrap();
        let files = SqliteFileRepository::new(pool.clone());
        let repo = SqliteCollaboratorRepository::new(pool.clone());
        let file_id = create_file(&files, "u-1").await;

        sqlx::query("INSERT INTO file_collaborators (file_id, user_id, role) VALUES (?, '9', 'admin')")
            .bind(file_id)
            .execute(&pool)
            .await
            .unwrap();

        let row = repo.get(file_id, "9").await.unwrap().unwrap();
        assert_eq!(row.role(), None);
        assert_eq!(row.level(), crate::role::ABSENT_LEVEL);
    }
}
