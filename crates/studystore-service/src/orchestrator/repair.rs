//! Reconciliation of an entity's primary folder with physical storage.

use serde::Serialize;
use tracing::{info, warn};

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_core::types::path;
use studystore_entity::folder::FolderRecord;

use super::CreateFolderOptions;
use super::service::StorageOrchestrator;
use crate::naming::StorageEntity;

/// What a repair run did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "folder", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// The primary record exists and so does its physical folder.
    Verified(FolderRecord),
    /// The primary record exists; its missing physical folder was created.
    Recreated(FolderRecord),
    /// There was no primary record; a folder was created under the parent
    /// entity's primary folder and linked as primary.
    Created(FolderRecord),
    /// The primary record is deactivated. Storage is not checked or touched.
    Deactivated(FolderRecord),
}

impl RepairOutcome {
    /// The entity's primary folder after the run.
    pub fn folder(&self) -> &FolderRecord {
        match self {
            Self::Verified(f) | Self::Recreated(f) | Self::Created(f) | Self::Deactivated(f) => f,
        }
    }

    /// Whether storage or metadata was changed.
    pub fn mutated(&self) -> bool {
        matches!(self, Self::Recreated(_) | Self::Created(_))
    }
}

impl StorageOrchestrator {
    /// Make sure `entity` has a primary folder record whose physical folder
    /// exists. Safe to run repeatedly; a run on a healthy entity changes
    /// nothing. Backend errors are returned, not swallowed.
    pub async fn repair(&self, entity: &StorageEntity) -> AppResult<RepairOutcome> {
        let reference = entity.reference();

        if let Some(primary) = self.store.find_primary_folder(reference).await? {
            if !primary.active {
                warn!(entity = %reference, folder_id = %primary.id, path = %primary.path, "Primary folder record is deactivated; skipping");
                return Ok(RepairOutcome::Deactivated(primary));
            }
            let (drive, adapter) = self.drive_and_adapter(primary.drive_id).await?;
            if adapter.folder_exists(&drive, &primary.path).await {
                info!(entity = %reference, path = %primary.path, "Primary folder verified");
                return Ok(RepairOutcome::Verified(primary));
            }

            warn!(entity = %reference, drive = %drive.display_name, path = %primary.path, "Primary folder missing; recreating");
            adapter
                .create_folder(
                    &drive,
                    &path::parent_path(&primary.path),
                    path::last_segment(&primary.path),
                )
                .await?;
            return Ok(RepairOutcome::Recreated(primary));
        }

        let parent = entity.parent.ok_or_else(|| {
            AppError::not_found(format!(
                "{reference} has no primary folder and no parent entity to create one under"
            ))
        })?;
        let parent_folder = self.store.find_primary_folder(parent).await?.ok_or_else(|| {
            AppError::not_found(format!(
                "Cannot repair {reference}: parent {parent} has no primary folder"
            ))
        })?;

        let created = self
            .create_folder_for(entity, &parent_folder, &CreateFolderOptions::primary())
            .await?;
        info!(entity = %reference, path = %created.path, "Primary folder created by repair");
        Ok(RepairOutcome::Created(created))
    }
}
