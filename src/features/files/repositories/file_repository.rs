use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, NewFileRecord};

/// File record store
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, record: NewFileRecord) -> Result<FileRecord>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>>;

    /// Records owned by `owner_id`, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<FileRecord>>;

    /// Returns false when no record had this id
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, record: NewFileRecord) -> Result<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (filename, original_name, path, size, mimetype, owner_id, columns, row_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, filename, original_name, path, size, mimetype, owner_id,
                      columns, row_count, created_at, updated_at
            "#,
        )
        .bind(&record.filename)
        .bind(&record.original_name)
        .bind(&record.path)
        .bind(record.size)
        .bind(&record.mimetype)
        .bind(record.owner_id)
        .bind(&record.columns)
        .bind(record.row_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save file record: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, filename, original_name, path, size, mimetype, owner_id,
                   columns, row_count, created_at, updated_at
            FROM files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, filename, original_name, path, size, mimetype, owner_id,
                   columns, row_count, created_at, updated_at
            FROM files
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete file record {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
