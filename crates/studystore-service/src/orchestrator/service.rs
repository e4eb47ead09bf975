//! Drive and folder operations for business entities.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};
use validator::Validate;

use studystore_core::config::FolderFailurePolicy;
use studystore_core::error::{AppError, ErrorKind};
use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId, path};
use studystore_database::MetadataStore;
use studystore_entity::association::{EntityFolder, EntityRef};
use studystore_entity::drive::Drive;
use studystore_entity::folder::{FileDescriptor, FolderListing, FolderPolicy, FolderRecord, NewFolderRecord};
use studystore_storage::{AdapterRegistry, StorageAdapter};

use super::{CreateFolderOptions, FolderDraft, display_name_or};
use crate::naming::{FolderNamer, SlugNamer, StorageEntity};

/// Facade over the metadata store and the storage adapters.
#[derive(Clone)]
pub struct StorageOrchestrator {
    pub(super) store: Arc<dyn MetadataStore>,
    pub(super) registry: Arc<AdapterRegistry>,
    namer: Arc<dyn FolderNamer>,
    failure_policy: FolderFailurePolicy,
}

impl fmt::Debug for StorageOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageOrchestrator")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

impl StorageOrchestrator {
    /// Create an orchestrator with the default namer and the `abort` failure
    /// policy.
    pub fn new(store: Arc<dyn MetadataStore>, registry: Arc<AdapterRegistry>) -> Self {
        Self {
            store,
            registry,
            namer: Arc::new(SlugNamer),
            failure_policy: FolderFailurePolicy::Abort,
        }
    }

    /// Replace the folder namer.
    pub fn with_namer(mut self, namer: impl FolderNamer) -> Self {
        self.namer = Arc::new(namer);
        self
    }

    /// Set the policy applied by [`Self::provision_folder`].
    pub fn with_failure_policy(mut self, policy: FolderFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// The metadata store.
    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    // ── Drives ──────────────────────────────────────────────────────

    /// Look up a drive.
    pub async fn find_drive(&self, drive_id: DriveId) -> AppResult<Drive> {
        self.store
            .find_drive(drive_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Drive {drive_id} not found")))
    }

    /// List drives, optionally only active ones.
    pub async fn list_drives(&self, active_only: bool) -> AppResult<Vec<Drive>> {
        self.store.list_drives(active_only).await
    }

    pub(super) async fn drive_and_adapter(
        &self,
        drive_id: DriveId,
    ) -> AppResult<(Drive, Arc<dyn StorageAdapter>)> {
        let drive = self.find_drive(drive_id).await?;
        let adapter = self.registry.for_drive(&drive)?;
        Ok((drive, adapter))
    }

    /// Look up a folder record.
    pub async fn find_folder(&self, folder_id: FolderId) -> AppResult<FolderRecord> {
        self.store
            .find_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    // ── Entity folders ──────────────────────────────────────────────

    /// Create the folder of `entity` below `parent` and link it.
    ///
    /// The folder name comes from the namer. If the drive already has a
    /// record at the resulting path, that record is linked instead of a
    /// duplicate being created; a deactivated record there is rejected with
    /// `Validation` before any backend call. A concurrent caller that wins
    /// the insert leaves this call linking the winner's record.
    pub async fn create_folder_for(
        &self,
        entity: &StorageEntity,
        parent: &FolderRecord,
        options: &CreateFolderOptions,
    ) -> AppResult<FolderRecord> {
        let (drive, adapter) = self.drive_and_adapter(parent.drive_id).await?;
        if !drive.active {
            return Err(AppError::validation(format!(
                "Drive '{}' is inactive and accepts no new folders",
                drive.display_name
            )));
        }

        let name = self.namer.folder_name(entity);
        let reference = entity.reference();
        let existing = self
            .store
            .find_folder_by_path(drive.id, &path::folder_path(&parent.path, &name))
            .await?;
        if let Some(existing) = existing.as_ref().filter(|f| !f.active) {
            return Err(AppError::validation(format!(
                "Folder record '{}' ({}) is deactivated and cannot be linked to {reference}",
                existing.path, existing.id
            )));
        }

        let listing = adapter.create_folder_in(&drive, parent, &name).await?;
        if let Some(existing) = existing {
            debug!(entity = %reference, folder_id = %existing.id, path = %existing.path, "Linking existing folder record");
            return self.link_existing(reference, existing, options).await;
        }

        let record = NewFolderRecord {
            drive_id: drive.id,
            name: display_name_or(options.display_name.as_deref(), &listing.name),
            path: listing.path,
            policy: FolderPolicy::writable(),
            details: listing.details,
        };
        match self
            .store
            .save_entity_folder(reference, &record, options.primary)
            .await
        {
            Ok(saved) => {
                info!(
                    entity = %reference,
                    folder_id = %saved.folder.id,
                    drive = %drive.display_name,
                    path = %saved.folder.path,
                    primary = saved.is_primary,
                    "Created entity folder"
                );
                Ok(saved.folder)
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                let winner = self
                    .store
                    .find_folder_by_path(drive.id, &record.path)
                    .await?
                    .ok_or(e)?;
                debug!(entity = %reference, folder_id = %winner.id, path = %winner.path, "Folder record created concurrently; linking it");
                self.link_existing(reference, winner, options).await
            }
            Err(e) => Err(e),
        }
    }

    async fn link_existing(
        &self,
        entity: EntityRef,
        folder: FolderRecord,
        options: &CreateFolderOptions,
    ) -> AppResult<FolderRecord> {
        if !folder.active {
            return Err(AppError::validation(format!(
                "Folder record '{}' ({}) is deactivated and cannot be linked to {entity}",
                folder.path, folder.id
            )));
        }
        Ok(self
            .store
            .link_folder(entity, folder.id, options.primary)
            .await?
            .folder)
    }

    /// Create the primary folder of a newly provisioned entity, applying the
    /// configured [`FolderFailurePolicy`].
    ///
    /// Under `best_effort` a failure is logged and `None` returned; a later
    /// repair creates the folder.
    pub async fn provision_folder(
        &self,
        entity: &StorageEntity,
        parent: &FolderRecord,
    ) -> AppResult<Option<FolderRecord>> {
        match self
            .create_folder_for(entity, parent, &CreateFolderOptions::primary())
            .await
        {
            Ok(folder) => Ok(Some(folder)),
            Err(e) if self.failure_policy == FolderFailurePolicy::BestEffort => {
                warn!(
                    entity = %entity.reference(),
                    parent = %parent.path,
                    error = %e,
                    "Storage folder not created; entity continues without one"
                );
                Ok(None)
            }
            Err(e) => Err(e.context(format!("Failed to provision folder for {}", entity.reference()))),
        }
    }

    /// Register an existing physical folder as a record. Nothing is created
    /// on the backend.
    pub async fn register_folder(&self, drive_id: DriveId, draft: &FolderDraft) -> AppResult<FolderRecord> {
        draft.validate()?;
        let (drive, adapter) = self.drive_and_adapter(drive_id).await?;
        let listing = adapter.find_folder_by_path(&drive, &draft.path).await?;

        let saved = self
            .store
            .save_folder(&NewFolderRecord {
                drive_id: drive.id,
                name: display_name_or(draft.name.as_deref(), &listing.name),
                path: listing.path,
                policy: draft.policy,
                details: listing.details,
            })
            .await?;
        info!(folder_id = %saved.id, drive = %drive.display_name, path = %saved.path, "Registered folder");
        Ok(saved)
    }

    /// Add an existing record to an entity's folder set.
    pub async fn attach_folder(
        &self,
        entity: EntityRef,
        folder_id: FolderId,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        let linked = self.store.link_folder(entity, folder_id, primary).await?;
        info!(%entity, %folder_id, primary, "Attached folder");
        Ok(linked)
    }

    /// The primary folder of `entity`.
    pub async fn find_primary_folder(&self, entity: EntityRef) -> AppResult<FolderRecord> {
        self.store
            .find_primary_folder(entity)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{entity} has no primary folder")))
    }

    /// All folders linked to `entity`, primary first.
    pub async fn list_entity_folders(&self, entity: EntityRef) -> AppResult<Vec<EntityFolder>> {
        self.store.find_entity_folders(entity).await
    }

    /// Deactivate a folder record. The physical folder is left untouched.
    pub async fn deactivate_folder(&self, folder_id: FolderId) -> AppResult<()> {
        let folder = self.find_folder(folder_id).await?;
        folder.require_delete()?;
        self.store.set_folder_active(folder_id, false).await?;
        info!(%folder_id, path = %folder.path, "Deactivated folder record");
        Ok(())
    }

    // ── Browsing and files ──────────────────────────────────────────

    /// Fresh listing of the folder at `path` on a drive.
    pub async fn browse(&self, drive_id: DriveId, path: &str) -> AppResult<FolderListing> {
        let (drive, adapter) = self.drive_and_adapter(drive_id).await?;
        adapter.find_folder_by_path(&drive, path).await
    }

    /// Look up the file at `path` on a drive.
    pub async fn find_file(&self, drive_id: DriveId, path: &str) -> AppResult<FileDescriptor> {
        let (drive, adapter) = self.drive_and_adapter(drive_id).await?;
        adapter.find_file_by_path(&drive, path).await
    }

    /// Whether a folder physically exists at `path` on a drive.
    pub async fn folder_exists(&self, drive_id: DriveId, path: &str) -> AppResult<bool> {
        let (drive, adapter) = self.drive_and_adapter(drive_id).await?;
        Ok(adapter.folder_exists(&drive, path).await)
    }

    /// Whether a file physically exists at `path` on a drive.
    pub async fn file_exists(&self, drive_id: DriveId, path: &str) -> AppResult<bool> {
        let (drive, adapter) = self.drive_and_adapter(drive_id).await?;
        Ok(adapter.file_exists(&drive, path).await)
    }

    /// Upload `content` as `name` into `path` below a folder record. An
    /// empty `path` means the folder itself.
    pub async fn save_file(
        &self,
        folder_id: FolderId,
        path: &str,
        name: &str,
        content: Bytes,
    ) -> AppResult<FileDescriptor> {
        let folder = self.active_folder(folder_id).await?;
        let (drive, adapter) = self.drive_and_adapter(folder.drive_id).await?;
        let target = if path.trim().is_empty() {
            folder.path.as_str()
        } else {
            path
        };
        adapter.save_file(&drive, &folder, target, name, content).await
    }

    /// Download the file at `path`, which must lie below the folder record.
    pub async fn fetch_file(&self, folder_id: FolderId, path: &str) -> AppResult<Bytes> {
        let folder = self.active_folder(folder_id).await?;
        if !path::is_within(&folder.path, path) {
            return Err(AppError::validation(format!(
                "Path '{path}' is outside folder '{}'",
                folder.path
            )));
        }
        let (drive, adapter) = self.drive_and_adapter(folder.drive_id).await?;
        adapter.fetch_file(&drive, &folder, path).await
    }

    async fn active_folder(&self, folder_id: FolderId) -> AppResult<FolderRecord> {
        let folder = self.find_folder(folder_id).await?;
        if !folder.active {
            return Err(AppError::validation(format!(
                "Folder '{}' ({folder_id}) is deactivated",
                folder.path
            )));
        }
        Ok(folder)
    }
}
