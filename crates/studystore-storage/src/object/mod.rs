//! Object-storage adapter.
//!
//! A folder is a zero-length marker object whose key is the canonical folder
//! path (trailing `/`). Listing a folder is a delimiter listing of that
//! prefix: rolled-up prefixes are child folders, remaining objects other
//! than the marker are files.

pub mod client;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, warn};

use studystore_core::error::{AppError, ErrorKind};
use studystore_core::result::AppResult;
use studystore_core::types::path;
use studystore_entity::drive::{Drive, DriveType};
use studystore_entity::folder::{FileDescriptor, FolderDetails, FolderListing};

pub use self::client::{ObjectInfo, ObjectListing, ObjectStoreClient, ObjectStoreError};
pub use self::memory::InMemoryObjectStore;
#[cfg(feature = "s3")]
pub use self::s3::S3ObjectStore;

use crate::adapter::StorageAdapter;
use crate::resolver::ClientResolver;

/// Adapter for S3-compatible object-storage drives.
#[derive(Debug, Clone)]
pub struct ObjectStorageAdapter {
    resolver: Arc<dyn ClientResolver>,
}

impl ObjectStorageAdapter {
    /// Create an adapter that looks up clients through `resolver`.
    pub fn new(resolver: Arc<dyn ClientResolver>) -> Self {
        Self { resolver }
    }

    async fn connect<'d>(&self, drive: &'d Drive) -> AppResult<(Arc<dyn ObjectStoreClient>, &'d str)> {
        let (bucket, _) = drive.bucket().ok_or_else(|| {
            AppError::validation(format!(
                "Drive '{}' has no bucket configured",
                drive.display_name
            ))
        })?;
        let client = self.resolver.client_for(drive).await?;
        Ok((client, bucket))
    }

    async fn list_folder(
        &self,
        client: &dyn ObjectStoreClient,
        drive: &Drive,
        bucket: &str,
        key: &str,
    ) -> AppResult<(ObjectListing, FolderListing)> {
        let raw = client
            .list_objects(bucket, key, Some(path::DELIMITER))
            .await
            .map_err(|e| backend_error("list folder", drive, key, e))?;

        let mut etag = None;
        let mut files = Vec::new();
        for object in &raw.objects {
            if object.key == key {
                etag.clone_from(&object.etag);
            } else if !path::is_folder_key(&object.key) {
                files.push(describe(object));
            }
        }
        let folders = raw
            .common_prefixes
            .iter()
            .map(|prefix| path::last_segment(prefix).to_string())
            .collect();

        let listing = FolderListing::new(
            key,
            path::last_segment(key),
            folders,
            files,
            FolderDetails::ObjectStorage {
                key: key.to_string(),
                etag,
            },
        );
        Ok((raw, listing))
    }
}

fn describe(object: &ObjectInfo) -> FileDescriptor {
    FileDescriptor {
        name: path::last_segment(&object.key).to_string(),
        path: object.key.clone(),
        size: object.size,
        last_modified: object.last_modified,
    }
}

fn backend_error(operation: &str, drive: &Drive, key: &str, err: ObjectStoreError) -> AppError {
    warn!(
        drive = %drive.display_name,
        key,
        error = %err,
        "Object storage {operation} failed"
    );
    AppError::with_source(
        ErrorKind::StorageBackend,
        format!("Failed to {operation} '{key}' on drive '{}'", drive.display_name),
        err,
    )
}

fn file_key(path: &str) -> AppResult<String> {
    let key = path.trim().trim_start_matches(path::DELIMITER);
    if key.is_empty() || path::is_folder_key(key) {
        return Err(AppError::validation(format!("'{path}' is not a file path")));
    }
    Ok(key.to_string())
}

#[async_trait]
impl StorageAdapter for ObjectStorageAdapter {
    fn name(&self) -> &str {
        "object_storage"
    }

    fn supports(&self, drive_type: DriveType) -> bool {
        drive_type == DriveType::ObjectStorage
    }

    async fn create_folder(&self, drive: &Drive, path: &str, name: &str) -> AppResult<FolderListing> {
        if name.trim().is_empty() || name.contains(path::DELIMITER) {
            return Err(AppError::validation(format!("Invalid folder name: '{name}'")));
        }
        let key = path::folder_path(path, name);
        let (client, bucket) = self.connect(drive).await?;

        let existing = client
            .head_object(bucket, &key)
            .await
            .map_err(|e| backend_error("check folder marker", drive, &key, e))?;
        if existing.is_none() {
            client
                .put_object(bucket, &key, Bytes::new())
                .await
                .map_err(|e| backend_error("create folder marker", drive, &key, e))?;
            info!(drive = %drive.display_name, bucket, key = %key, "Created folder marker");
        } else {
            debug!(drive = %drive.display_name, key = %key, "Folder marker already present");
        }

        let (_, listing) = self.list_folder(client.as_ref(), drive, bucket, &key).await?;
        Ok(listing)
    }

    async fn find_folder_by_path(&self, drive: &Drive, path: &str) -> AppResult<FolderListing> {
        let key = path::normalize_folder_path(path);
        let (client, bucket) = self.connect(drive).await?;
        let (raw, listing) = self.list_folder(client.as_ref(), drive, bucket, &key).await?;
        if raw.is_empty() && !key.is_empty() {
            return Err(AppError::not_found(format!(
                "Folder '{key}' not found on drive '{}'",
                drive.display_name
            )));
        }
        Ok(listing)
    }

    async fn find_file_by_path(&self, drive: &Drive, path: &str) -> AppResult<FileDescriptor> {
        let key = file_key(path).map_err(|_| {
            AppError::not_found(format!("'{path}' does not name a file"))
        })?;
        let (client, bucket) = self.connect(drive).await?;
        let info = client
            .head_object(bucket, &key)
            .await
            .map_err(|e| backend_error("look up file", drive, &key, e))?;
        info.map(|info| describe(&info)).ok_or_else(|| {
            AppError::not_found(format!(
                "File '{key}' not found on drive '{}'",
                drive.display_name
            ))
        })
    }

    async fn put_file(&self, drive: &Drive, path: &str, content: Bytes) -> AppResult<()> {
        let key = file_key(path)?;
        let (client, bucket) = self.connect(drive).await?;
        let size = content.len();
        client
            .put_object(bucket, &key, content)
            .await
            .map_err(|e| backend_error("upload file", drive, &key, e))?;
        info!(drive = %drive.display_name, key = %key, size, "Uploaded file");
        Ok(())
    }

    async fn read_file(&self, drive: &Drive, path: &str) -> AppResult<Bytes> {
        let key = file_key(path)?;
        let (client, bucket) = self.connect(drive).await?;
        client
            .get_object(bucket, &key)
            .await
            .map_err(|e| backend_error("download file", drive, &key, e))?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "File '{key}' not found on drive '{}'",
                    drive.display_name
                ))
            })
    }

    async fn file_exists(&self, drive: &Drive, path: &str) -> bool {
        match self.find_file_by_path(drive, path).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                warn!(drive = %drive.display_name, path, error = %e, "File existence check failed");
                false
            }
        }
    }

    async fn folder_exists(&self, drive: &Drive, path: &str) -> bool {
        let key = path::normalize_folder_path(path);
        let (client, bucket) = match self.connect(drive).await {
            Ok(connected) => connected,
            Err(e) => {
                warn!(drive = %drive.display_name, path, error = %e, "Folder existence check failed");
                return false;
            }
        };
        match client.list_objects(bucket, &key, Some(path::DELIMITER)).await {
            Ok(listing) => key.is_empty() || !listing.is_empty(),
            Err(e) => {
                warn!(drive = %drive.display_name, path, error = %e, "Folder existence check failed");
                false
            }
        }
    }
}
