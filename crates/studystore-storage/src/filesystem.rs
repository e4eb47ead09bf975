//! Filesystem adapter for local directories and mounted network shares.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info, warn};

use studystore_core::error::{AppError, ErrorKind};
use studystore_core::result::AppResult;
use studystore_core::types::path;
use studystore_entity::drive::{Drive, DriveType};
use studystore_entity::folder::{FileDescriptor, FolderDetails, FolderListing};

use crate::adapter::StorageAdapter;

/// Adapter serving drives whose data lives in a directory tree.
///
/// Each drive is rooted at its configured mount path; network shares are
/// expected to be mounted by the operating system.
#[derive(Debug, Clone, Default)]
pub struct FilesystemAdapter;

impl FilesystemAdapter {
    /// Create a filesystem adapter.
    pub fn new() -> Self {
        Self
    }

    /// Resolve a drive-relative path to an absolute path below the drive's
    /// mount path. Parent and absolute components are rejected.
    fn resolve(&self, drive: &Drive, relative: &str) -> AppResult<PathBuf> {
        let root = drive.mount_path().ok_or_else(|| {
            AppError::validation(format!(
                "Drive '{}' has no mount path configured",
                drive.display_name
            ))
        })?;
        let clean = relative.trim().trim_start_matches(path::DELIMITER);
        let clean_path = Path::new(clean);
        if clean_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AppError::validation(format!(
                "Path '{relative}' escapes the drive root"
            )));
        }
        Ok(PathBuf::from(root).join(clean_path))
    }

    async fn listing(&self, drive: &Drive, folder: &str) -> AppResult<FolderListing> {
        let full = self.resolve(drive, folder)?;
        let mut entries = fs::read_dir(&full)
            .await
            .map_err(|e| io_error(e, "list folder", folder))?;

        let mut folders = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(e, "list folder", folder))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| io_error(e, "read metadata in", folder))?;
            if metadata.is_dir() {
                folders.push(name);
            } else {
                files.push(FileDescriptor {
                    path: path::join_path(folder, &name),
                    name,
                    size: metadata.len(),
                    last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }

        Ok(FolderListing::new(
            folder,
            path::last_segment(folder),
            folders,
            files,
            FolderDetails::Filesystem,
        ))
    }
}

fn io_error(err: std::io::Error, operation: &str, path: &str) -> AppError {
    if err.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("'{path}' not found"))
    } else {
        AppError::with_source(
            ErrorKind::StorageBackend,
            format!("Failed to {operation} '{path}'"),
            err,
        )
    }
}

#[async_trait]
impl StorageAdapter for FilesystemAdapter {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn supports(&self, drive_type: DriveType) -> bool {
        drive_type.is_filesystem()
    }

    async fn create_folder(&self, drive: &Drive, parent: &str, name: &str) -> AppResult<FolderListing> {
        if name.trim().is_empty() || name.contains(path::DELIMITER) {
            return Err(AppError::validation(format!("Invalid folder name: '{name}'")));
        }
        let folder = path::folder_path(parent, name);
        let full = self.resolve(drive, &folder)?;
        if fs::metadata(&full).await.map(|m| m.is_dir()).unwrap_or(false) {
            debug!(drive = %drive.display_name, path = %folder, "Directory already present");
        } else {
            fs::create_dir_all(&full)
                .await
                .map_err(|e| io_error(e, "create folder", &folder))?;
            info!(drive = %drive.display_name, path = %folder, "Created directory");
        }
        self.listing(drive, &folder).await
    }

    async fn find_folder_by_path(&self, drive: &Drive, folder: &str) -> AppResult<FolderListing> {
        let folder = path::normalize_folder_path(folder);
        let full = self.resolve(drive, &folder)?;
        match fs::metadata(&full).await {
            Ok(m) if m.is_dir() => self.listing(drive, &folder).await,
            Ok(_) => Err(AppError::not_found(format!("'{folder}' is not a folder"))),
            Err(e) => Err(io_error(e, "look up folder", &folder)),
        }
    }

    async fn find_file_by_path(&self, drive: &Drive, file: &str) -> AppResult<FileDescriptor> {
        if path::is_folder_key(file) {
            return Err(AppError::not_found(format!("'{file}' does not name a file")));
        }
        let full = self.resolve(drive, file)?;
        let metadata = fs::metadata(&full)
            .await
            .map_err(|e| io_error(e, "look up file", file))?;
        if metadata.is_dir() {
            return Err(AppError::not_found(format!("'{file}' is a folder")));
        }
        Ok(FileDescriptor {
            name: path::last_segment(file).to_string(),
            path: file.trim_start_matches(path::DELIMITER).to_string(),
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    async fn put_file(&self, drive: &Drive, file: &str, content: Bytes) -> AppResult<()> {
        if file.trim().is_empty() || path::is_folder_key(file) {
            return Err(AppError::validation(format!("'{file}' is not a file path")));
        }
        let full = self.resolve(drive, file)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(e, "create parent of", file))?;
        }
        fs::write(&full, &content)
            .await
            .map_err(|e| io_error(e, "write file", file))?;
        debug!(drive = %drive.display_name, path = file, bytes = content.len(), "Wrote file");
        Ok(())
    }

    async fn read_file(&self, drive: &Drive, file: &str) -> AppResult<Bytes> {
        let full = self.resolve(drive, file)?;
        let data = fs::read(&full)
            .await
            .map_err(|e| io_error(e, "read file", file))?;
        Ok(Bytes::from(data))
    }

    async fn file_exists(&self, drive: &Drive, file: &str) -> bool {
        match self.find_file_by_path(drive, file).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                warn!(drive = %drive.display_name, path = file, error = %e, "File existence check failed");
                false
            }
        }
    }

    async fn folder_exists(&self, drive: &Drive, folder: &str) -> bool {
        match self.resolve(drive, folder) {
            Ok(full) => fs::metadata(&full).await.map(|m| m.is_dir()).unwrap_or(false),
            Err(e) => {
                warn!(drive = %drive.display_name, path = folder, error = %e, "Folder existence check failed");
                false
            }
        }
    }
}
