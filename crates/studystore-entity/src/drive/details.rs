//! Backend-specific drive details.

use serde::{Deserialize, Serialize};

use super::drive_type::DriveType;

/// Backend-specific configuration of a drive, one variant per backend family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriveDetails {
    /// An S3-compatible bucket reached through a named integration.
    ObjectStorage {
        /// Bucket name.
        bucket: String,
        /// Name of the integration holding endpoint and credentials.
        integration: String,
    },
    /// A directory tree on a local disk or mounted share.
    Filesystem {
        /// Absolute mount path of the drive root.
        mount_path: String,
    },
}

impl DriveDetails {
    /// Whether these details are valid for a drive of `drive_type`.
    pub fn matches(&self, drive_type: DriveType) -> bool {
        match self {
            Self::ObjectStorage { .. } => drive_type == DriveType::ObjectStorage,
            Self::Filesystem { .. } => drive_type.is_filesystem(),
        }
    }
}
