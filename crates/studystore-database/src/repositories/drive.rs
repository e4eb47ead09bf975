//! Drive repository implementation.

use sqlx::PgPool;
use sqlx::types::Json;

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_core::types::DriveId;
use studystore_entity::drive::{Drive, NewDrive};

use super::map_db_error;

/// Repository for storage drive records.
#[derive(Debug, Clone)]
pub struct DriveRepository {
    pool: PgPool,
}

impl DriveRepository {
    /// Create a new drive repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a drive by ID.
    pub async fn find_by_id(&self, id: DriveId) -> AppResult<Option<Drive>> {
        sqlx::query_as::<_, Drive>("SELECT * FROM storage_drives WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find drive", e))
    }

    /// Find a drive by display name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Drive>> {
        sqlx::query_as::<_, Drive>("SELECT * FROM storage_drives WHERE display_name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find drive by name", e))
    }

    /// List drives, optionally only the active ones.
    pub async fn find_all(&self, active_only: bool) -> AppResult<Vec<Drive>> {
        sqlx::query_as::<_, Drive>(
            "SELECT * FROM storage_drives WHERE active OR NOT $1 ORDER BY display_name ASC",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list drives", e))
    }

    /// Insert a new drive.
    pub async fn create(&self, data: &NewDrive) -> AppResult<Drive> {
        sqlx::query_as::<_, Drive>(
            "INSERT INTO storage_drives (id, drive_type, display_name, root_path, details) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(DriveId::new())
        .bind(data.drive_type)
        .bind(&data.display_name)
        .bind(&data.root_path)
        .bind(Json(&data.details))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create drive", e))
    }

    /// Set the active flag.
    pub async fn set_active(&self, id: DriveId, active: bool) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE storage_drives SET active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to update drive", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Drive {id} not found")));
        }
        Ok(())
    }
}
