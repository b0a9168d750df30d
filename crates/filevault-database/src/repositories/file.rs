//! File repository contract and its PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::types::{FileId, OwnerId};
use filevault_entity::file::{CreateFileRecord, FileRecord, FileStats, MovePlan};

/// Persistence operations over file records.
///
/// Owner-scoped operations treat a record owned by someone else exactly
/// like a missing one and return a `NotFound` error.
#[async_trait]
pub trait FileRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Insert a record at the end of its owner's collection.
    async fn create(&self, data: &CreateFileRecord) -> AppResult<FileRecord>;

    /// All records of an owner in ascending position order, optionally
    /// restricted to those carrying `tag`.
    async fn list_by_owner(&self, owner: OwnerId, tag: Option<&str>) -> AppResult<Vec<FileRecord>>;

    /// Look up a record regardless of owner.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileRecord>>;

    /// Look up a record owned by `owner`.
    async fn find_owned(&self, id: FileId, owner: OwnerId) -> AppResult<Option<FileRecord>>;

    /// Replace the tag set of an owned record.
    async fn update_tags(&self, id: FileId, owner: OwnerId, tags: &[String])
    -> AppResult<FileRecord>;

    /// Move an owned record to `requested`, shifting the records in between.
    async fn move_to_position(
        &self,
        id: FileId,
        owner: OwnerId,
        requested: i64,
    ) -> AppResult<FileRecord>;

    /// Remove an owned record. Remaining positions are left untouched.
    async fn delete(&self, id: FileId, owner: OwnerId) -> AppResult<()>;

    /// Count a view and stamp the view time.
    async fn record_view(&self, id: FileId) -> AppResult<FileStats>;

    /// Count a download.
    async fn record_download(&self, id: FileId) -> AppResult<FileStats>;

    /// Count a share link handed out for an owned record.
    async fn record_share(&self, id: FileId, owner: OwnerId) -> AppResult<FileStats>;
}

pub(crate) fn file_not_found(id: FileId) -> AppError {
    AppError::not_found(format!("File {id} not found"))
}

/// Take the per-owner transaction lock that serializes every write
/// touching an owner's positions. Released on commit or rollback.
async fn lock_owner(tx: &mut Transaction<'_, Postgres>, owner: OwnerId) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::uuid::text, 0))")
        .bind(owner)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock owner", e))?;
    Ok(())
}

/// PostgreSQL-backed file repository.
#[derive(Debug, Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    async fn create(&self, data: &CreateFileRecord) -> AppResult<FileRecord> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Two appends for one owner would otherwise read the same MAX.
        lock_owner(&mut tx, data.owner_id).await?;

        let record = sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files (id, owner_id, name, mime_type, size_bytes, storage_path, url, thumbnail_url, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                     (SELECT COALESCE(MAX(position), 0) + 1 FROM files WHERE owner_id = $2)) \
             RETURNING *",
        )
        .bind(FileId::new())
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.storage_path)
        .bind(&data.url)
        .bind(&data.thumbnail_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit file", e)
        })?;

        Ok(record)
    }

    async fn list_by_owner(&self, owner: OwnerId, tag: Option<&str>) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND ($2::TEXT IS NULL OR $2 = ANY(tags)) \
             ORDER BY position ASC",
        )
        .bind(owner)
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_owned(&self, id: FileId, owner: OwnerId) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn update_tags(
        &self,
        id: FileId,
        owner: OwnerId,
        tags: &[String],
    ) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET tags = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner)
        .bind(tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update tags", e))?
        .ok_or_else(|| file_not_found(id))
    }

    async fn move_to_position(
        &self,
        id: FileId,
        owner: OwnerId,
        requested: i64,
    ) -> AppResult<FileRecord> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        lock_owner(&mut tx, owner).await?;

        let rows: Vec<(FileId, i64)> = sqlx::query_as(
            "SELECT id, position FROM files WHERE owner_id = $1 ORDER BY position FOR UPDATE",
        )
        .bind(owner)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock positions", e))?;

        let current = rows
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, position)| *position)
            .ok_or_else(|| file_not_found(id))?;
        let max_position = rows.last().map(|(_, position)| *position).unwrap_or(current);

        let plan = MovePlan::compute(current, requested, max_position)?;

        if let Some(shift) = plan.shift {
            let shifted = sqlx::query(
                "UPDATE files SET position = position + $1, updated_at = NOW() \
                 WHERE owner_id = $2 AND id <> $3 AND position BETWEEN $4 AND $5",
            )
            .bind(shift.delta)
            .bind(owner)
            .bind(id)
            .bind(shift.from)
            .bind(shift.to)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to shift positions", e)
            })?;
            debug!(
                file_id = %id,
                shifted = shifted.rows_affected(),
                delta = shift.delta,
                "Shifted neighbouring positions"
            );
        }

        let record = sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET position = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner)
        .bind(plan.target)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move file", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit reorder", e)
        })?;

        Ok(record)
    }

    async fn delete(&self, id: FileId, owner: OwnerId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;

        if result.rows_affected() == 0 {
            return Err(file_not_found(id));
        }
        Ok(())
    }

    async fn record_view(&self, id: FileId) -> AppResult<FileStats> {
        sqlx::query_as::<_, FileStats>(
            "UPDATE files SET view_count = view_count + 1, last_viewed_at = NOW() \
             WHERE id = $1 RETURNING view_count, download_count, last_viewed_at, share_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record view", e))?
        .ok_or_else(|| file_not_found(id))
    }

    async fn record_download(&self, id: FileId) -> AppResult<FileStats> {
        sqlx::query_as::<_, FileStats>(
            "UPDATE files SET download_count = download_count + 1 \
             WHERE id = $1 RETURNING view_count, download_count, last_viewed_at, share_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record download", e))?
        .ok_or_else(|| file_not_found(id))
    }

    async fn record_share(&self, id: FileId, owner: OwnerId) -> AppResult<FileStats> {
        sqlx::query_as::<_, FileStats>(
            "UPDATE files SET share_count = share_count + 1 \
             WHERE id = $1 AND owner_id = $2 RETURNING view_count, download_count, last_viewed_at, share_count",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record share", e))?
        .ok_or_else(|| file_not_found(id))
    }
}
