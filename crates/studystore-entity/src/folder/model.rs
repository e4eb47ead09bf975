//! Folder record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId};

/// Policy flags controlling what may be done through a folder record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromRow)]
pub struct FolderPolicy {
    /// The folder is offered as a root in file browsers.
    pub browser_root: bool,
    /// New study folders may be created below this folder.
    pub study_root: bool,
    /// Files and sub-folders may be written below this folder.
    pub write_enabled: bool,
    /// The folder record may be deactivated.
    pub delete_enabled: bool,
}

impl FolderPolicy {
    /// Policy for folders created for business entities.
    pub fn writable() -> Self {
        Self {
            write_enabled: true,
            ..Self::default()
        }
    }
}

/// Backend-specific details of a folder, one variant per backend family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FolderDetails {
    /// Folder represented by a zero-length marker object.
    ObjectStorage {
        /// Key of the marker object.
        key: String,
        /// ETag of the marker object, when the backend reported one.
        etag: Option<String>,
    },
    /// Folder represented by a directory.
    Filesystem,
}

/// A registered logical folder on a drive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FolderRecord {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The drive this folder resides on. Never changes after creation.
    pub drive_id: DriveId,
    /// Display name.
    pub name: String,
    /// Canonical drive-relative path (trailing delimiter).
    pub path: String,
    /// Policy flags.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub policy: FolderPolicy,
    /// Backend-specific details.
    #[sqlx(json)]
    pub details: FolderDetails,
    /// Deactivated records are kept but no longer offered.
    pub active: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FolderRecord {
    /// Fail unless writes are allowed through this folder.
    pub fn require_write(&self) -> AppResult<()> {
        if self.policy.write_enabled {
            Ok(())
        } else {
            Err(AppError::insufficient_privileges(format!(
                "Folder '{}' ({}) is not write-enabled",
                self.path, self.id
            )))
        }
    }

    /// Fail unless this folder record may be deleted.
    pub fn require_delete(&self) -> AppResult<()> {
        if self.policy.delete_enabled {
            Ok(())
        } else {
            Err(AppError::insufficient_privileges(format!(
                "Folder '{}' ({}) is not delete-enabled",
                self.path, self.id
            )))
        }
    }
}

/// Data required to persist a new folder record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFolderRecord {
    /// Owning drive.
    pub drive_id: DriveId,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Canonical drive-relative path.
    pub path: String,
    /// Policy flags.
    pub policy: FolderPolicy,
    /// Backend-specific details.
    pub details: FolderDetails,
}
