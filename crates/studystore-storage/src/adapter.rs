//! The backend adapter contract implemented once per drive family.

use async_trait::async_trait;
use bytes::Bytes;

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_core::types::path;
use studystore_entity::drive::{Drive, DriveType};
use studystore_entity::folder::{FileDescriptor, FolderListing, FolderRecord};

/// Folder and file operations over one family of storage backends.
///
/// Paths are drive-relative and use `/` as the delimiter; see
/// [`studystore_core::types::path`]. Folder-scoped operations are provided
/// methods that enforce the folder record's policy flags before any backend
/// call is made, so every adapter honours them the same way.
#[async_trait]
pub trait StorageAdapter: Send + Sync + std::fmt::Debug + 'static {
    /// Adapter name used in logs (e.g. `"s3"`, `"filesystem"`).
    fn name(&self) -> &str;

    /// Whether this adapter can serve drives of `drive_type`.
    fn supports(&self, drive_type: DriveType) -> bool;

    /// Create the folder `name` under `path`, or return the existing one.
    ///
    /// Must be idempotent: when the folder already exists its listing is
    /// returned and nothing is written.
    async fn create_folder(&self, drive: &Drive, path: &str, name: &str)
    -> AppResult<FolderListing>;

    /// Look up a folder. The path is normalized to its canonical
    /// trailing-delimiter form before querying.
    async fn find_folder_by_path(&self, drive: &Drive, path: &str) -> AppResult<FolderListing>;

    /// Look up a file. A folder at `path` is reported as not found.
    async fn find_file_by_path(&self, drive: &Drive, path: &str) -> AppResult<FileDescriptor>;

    /// Write `content` to the file at `path`, replacing any previous content.
    async fn put_file(&self, drive: &Drive, path: &str, content: Bytes) -> AppResult<()>;

    /// Read the full content of the file at `path`.
    async fn read_file(&self, drive: &Drive, path: &str) -> AppResult<Bytes>;

    /// Whether a file exists at `path`. Backend errors yield `false`.
    async fn file_exists(&self, drive: &Drive, path: &str) -> bool;

    /// Whether a folder exists at `path`. Backend errors yield `false`.
    async fn folder_exists(&self, drive: &Drive, path: &str) -> bool;

    /// Create the folder `name` directly below `parent`.
    async fn create_folder_in(
        &self,
        drive: &Drive,
        parent: &FolderRecord,
        name: &str,
    ) -> AppResult<FolderListing> {
        ensure_same_drive(drive, parent)?;
        parent.require_write()?;
        self.create_folder(drive, &parent.path, name).await
    }

    /// Upload a file named `name` into `path`, which must lie inside `folder`,
    /// and return its descriptor as re-read from the backend.
    async fn save_file(
        &self,
        drive: &Drive,
        folder: &FolderRecord,
        path: &str,
        name: &str,
        content: Bytes,
    ) -> AppResult<FileDescriptor> {
        ensure_same_drive(drive, folder)?;
        folder.require_write()?;
        if name.trim().is_empty() || name.contains(path::DELIMITER) {
            return Err(AppError::validation(format!("Invalid file name: '{name}'")));
        }
        if !path::is_within(&folder.path, path) {
            return Err(AppError::validation(format!(
                "Path '{path}' is outside folder '{}'",
                folder.path
            )));
        }
        let file_path = path::join_path(path, name);
        self.put_file(drive, &file_path, content).await?;
        self.find_file_by_path(drive, &file_path).await
    }

    /// Download the file at `path` on the folder's drive.
    async fn fetch_file(&self, drive: &Drive, folder: &FolderRecord, path: &str) -> AppResult<Bytes> {
        ensure_same_drive(drive, folder)?;
        self.read_file(drive, path).await
    }

    /// Folder-scoped variant of [`StorageAdapter::find_folder_by_path`].
    async fn find_folder_in(
        &self,
        drive: &Drive,
        folder: &FolderRecord,
        path: &str,
    ) -> AppResult<FolderListing> {
        ensure_same_drive(drive, folder)?;
        self.find_folder_by_path(drive, path).await
    }

    /// Folder-scoped variant of [`StorageAdapter::find_file_by_path`].
    async fn find_file_in(
        &self,
        drive: &Drive,
        folder: &FolderRecord,
        path: &str,
    ) -> AppResult<FileDescriptor> {
        ensure_same_drive(drive, folder)?;
        self.find_file_by_path(drive, path).await
    }

    /// Folder-scoped variant of [`StorageAdapter::file_exists`].
    async fn file_exists_in(&self, drive: &Drive, folder: &FolderRecord, path: &str) -> bool {
        folder.drive_id == drive.id && self.file_exists(drive, path).await
    }

    /// Folder-scoped variant of [`StorageAdapter::folder_exists`].
    async fn folder_exists_in(&self, drive: &Drive, folder: &FolderRecord, path: &str) -> bool {
        folder.drive_id == drive.id && self.folder_exists(drive, path).await
    }
}

fn ensure_same_drive(drive: &Drive, folder: &FolderRecord) -> AppResult<()> {
    if folder.drive_id == drive.id {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Folder {} belongs to drive {}, not {}",
            folder.id, folder.drive_id, drive.id
        )))
    }
}
