//! The metadata store seam.

use async_trait::async_trait;

use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId};
use studystore_entity::association::{EntityFolder, EntityRef};
use studystore_entity::drive::{Drive, NewDrive};
use studystore_entity::folder::{FolderRecord, NewFolderRecord};

/// Persistence of drives, folder records and entity-folder links.
///
/// Each method is one unit of work: implementations run multi-statement
/// writes inside a single transaction.
#[async_trait]
pub trait MetadataStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a drive by ID.
    async fn find_drive(&self, id: DriveId) -> AppResult<Option<Drive>>;

    /// Find a drive by its display name.
    async fn find_drive_by_name(&self, name: &str) -> AppResult<Option<Drive>>;

    /// List drives ordered by display name.
    async fn list_drives(&self, active_only: bool) -> AppResult<Vec<Drive>>;

    /// Register a drive. Fails with `Conflict` if the name is taken.
    async fn save_drive(&self, drive: &NewDrive) -> AppResult<Drive>;

    /// Activate or deactivate a drive.
    async fn set_drive_active(&self, id: DriveId, active: bool) -> AppResult<()>;

    /// Find a folder record by ID.
    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderRecord>>;

    /// Find the folder record at `path` on a drive.
    async fn find_folder_by_path(&self, drive_id: DriveId, path: &str) -> AppResult<Option<FolderRecord>>;

    /// List the folder records of a drive ordered by path.
    async fn list_folders(&self, drive_id: DriveId) -> AppResult<Vec<FolderRecord>>;

    /// Persist a folder record. Fails with `Conflict` if the drive already
    /// has a record at that path.
    async fn save_folder(&self, folder: &NewFolderRecord) -> AppResult<FolderRecord>;

    /// Persist a folder record and link it to `entity` in one transaction.
    ///
    /// When `primary` is set, any previous primary link of the entity is
    /// demoted in the same transaction.
    async fn save_entity_folder(
        &self,
        entity: EntityRef,
        folder: &NewFolderRecord,
        primary: bool,
    ) -> AppResult<EntityFolder>;

    /// Link an existing folder record to `entity`. Re-linking updates the
    /// primary flag. Fails with `NotFound` if the record does not exist.
    async fn link_folder(
        &self,
        entity: EntityRef,
        folder_id: FolderId,
        primary: bool,
    ) -> AppResult<EntityFolder>;

    /// All folder records linked to `entity`, primary first.
    async fn find_entity_folders(&self, entity: EntityRef) -> AppResult<Vec<EntityFolder>>;

    /// The primary folder record of `entity`, if any.
    async fn find_primary_folder(&self, entity: EntityRef) -> AppResult<Option<FolderRecord>>;

    /// Activate or deactivate a folder record.
    async fn set_folder_active(&self, id: FolderId, active: bool) -> AppResult<()>;
}
