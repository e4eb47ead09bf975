//! Folder record repository implementation.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId};
use studystore_entity::folder::{FolderRecord, NewFolderRecord};

use super::map_db_error;

/// Repository for folder records.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder record by ID.
    pub async fn find_by_id(&self, id: FolderId) -> AppResult<Option<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>("SELECT * FROM storage_folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find folder", e))
    }

    /// Find a folder record by drive and canonical path.
    pub async fn find_by_path(&self, drive_id: DriveId, path: &str) -> AppResult<Option<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>(
            "SELECT * FROM storage_folders WHERE drive_id = $1 AND path = $2",
        )
        .bind(drive_id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find folder by path", e))
    }

    /// List folder records of a drive.
    pub async fn find_by_drive(&self, drive_id: DriveId) -> AppResult<Vec<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>(
            "SELECT * FROM storage_folders WHERE drive_id = $1 ORDER BY path ASC",
        )
        .bind(drive_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list folders", e))
    }

    /// Insert a folder record.
    pub async fn create(&self, data: &NewFolderRecord) -> AppResult<FolderRecord> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_db_error("Failed to acquire connection", e))?;
        insert(&mut conn, data).await
    }

    /// Set the active flag.
    pub async fn set_active(&self, id: FolderId, active: bool) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE storage_folders SET active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to update folder", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }
        Ok(())
    }
}

/// Insert a folder record on an existing connection or transaction.
pub(crate) async fn insert(conn: &mut PgConnection, data: &NewFolderRecord) -> AppResult<FolderRecord> {
    sqlx::query_as::<_, FolderRecord>(
        "INSERT INTO storage_folders \
         (id, drive_id, name, path, browser_root, study_root, write_enabled, delete_enabled, details) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(FolderId::new())
    .bind(data.drive_id)
    .bind(&data.name)
    .bind(&data.path)
    .bind(data.policy.browser_root)
    .bind(data.policy.study_root)
    .bind(data.policy.write_enabled)
    .bind(data.policy.delete_enabled)
    .bind(Json(&data.details))
    .fetch_one(conn)
    .await
    .map_err(|e| map_db_error(&format!("Failed to create folder '{}'", data.path), e))
}
