//! Transient folder listings and file descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::FolderDetails;

/// A file found on a drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name (last path segment).
    pub name: String,
    /// Drive-relative path of the file.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the backend reports one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// The physical contents of a folder, looked up fresh from its backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    /// Canonical drive-relative path (trailing delimiter).
    pub path: String,
    /// Folder name (last path segment).
    pub name: String,
    /// Names of direct child folders, sorted and unique.
    pub folders: Vec<String>,
    /// Direct child files, sorted by name.
    pub files: Vec<FileDescriptor>,
    /// Backend details of the folder itself.
    pub details: FolderDetails,
}

impl FolderListing {
    /// Build a listing, ordering folders and files by name.
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        mut folders: Vec<String>,
        mut files: Vec<FileDescriptor>,
        details: FolderDetails,
    ) -> Self {
        folders.sort();
        folders.dedup();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            path: path.into(),
            name: name.into(),
            folders,
            files,
            details,
        }
    }

    /// Whether the folder has no children.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}
