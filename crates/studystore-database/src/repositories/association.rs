//! Entity-folder link repository implementation.

use sqlx::{FromRow, PgConnection, PgPool};

use studystore_core::result::AppResult;
use studystore_core::types::FolderId;
use studystore_entity::association::{EntityFolder, EntityRef};
use studystore_entity::folder::{FolderRecord, NewFolderRecord};

use super::{folder, map_db_error};

#[derive(Debug, FromRow)]
struct LinkedFolderRow {
    #[sqlx(flatten)]
    folder: FolderRecord,
    is_primary: bool,
}

impl From<LinkedFolderRow> for EntityFolder {
    fn from(row: LinkedFolderRow) -> Self {
        Self {
            folder: row.folder,
            is_primary: row.is_primary,
        }
    }
}

/// Repository for the folder sets of business entities.
#[derive(Debug, Clone)]
pub struct EntityFolderRepository {
    pool: PgPool,
}

impl EntityFolderRepository {
    /// Create a new entity-folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All folders linked to an entity, primary first.
    pub async fn find_by_entity(&self, entity: EntityRef) -> AppResult<Vec<EntityFolder>> {
        let rows = sqlx::query_as::<_, LinkedFolderRow>(
            "SELECT f.*, l.is_primary FROM entity_storage_folders l \
             JOIN storage_folders f ON f.id = l.folder_id \
             WHERE l.entity_kind = $1 AND l.entity_id = $2 \
             ORDER BY l.is_primary DESC, f.path ASC",
        )
        .bind(entity.kind)
        .bind(entity.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list entity folders", e))?;
        Ok(rows.into_iter().map(EntityFolder::from).collect())
    }

    /// The primary folder of an entity.
    pub async fn find_primary(&self, entity: EntityRef) -> AppResult<Option<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>(
            "SELECT f.* FROM entity_storage_folders l \
             JOIN storage_folders f ON f.id = l.folder_id \
             WHERE l.entity_kind = $1 AND l.entity_id = $2 AND l.is_primary",
        )
        .bind(entity.kind)
        .bind(entity.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find primary folder", e))
    }

    /// Insert a folder record and link it, in one transaction.
    pub async fn create_linked(
        &self,
        entity: EntityRef,
        data: &NewFolderRecord,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;
        let record = folder::insert(&mut *tx, data).await?;
        let is_primary = link(&mut *tx, entity, record.id, primary).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit entity folder", e))?;
        Ok(EntityFolder {
            folder: record,
            is_primary,
        })
    }

    /// Link an existing folder record, in one transaction. Returns whether
    /// the link is primary afterwards.
    pub async fn link(&self, entity: EntityRef, folder_id: FolderId, primary: bool) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;
        let is_primary = link(&mut *tx, entity, folder_id, primary).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit folder link", e))?;
        Ok(is_primary)
    }
}

/// Upsert a link. A non-primary link never demotes an existing primary one.
async fn link(conn: &mut PgConnection, entity: EntityRef, folder_id: FolderId, primary: bool) -> AppResult<bool> {
    if primary {
        sqlx::query(
            "UPDATE entity_storage_folders SET is_primary = FALSE \
             WHERE entity_kind = $1 AND entity_id = $2 AND folder_id <> $3 AND is_primary",
        )
        .bind(entity.kind)
        .bind(entity.id)
        .bind(folder_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Failed to demote previous primary folder", e))?;
    }

    sqlx::query_scalar::<_, bool>(
        "INSERT INTO entity_storage_folders (entity_kind, entity_id, folder_id, is_primary) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (entity_kind, entity_id, folder_id) \
         DO UPDATE SET is_primary = entity_storage_folders.is_primary OR EXCLUDED.is_primary \
         RETURNING is_primary",
    )
    .bind(entity.kind)
    .bind(entity.id)
    .bind(folder_id)
    .bind(primary)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_error("Failed to link folder", e))
}
