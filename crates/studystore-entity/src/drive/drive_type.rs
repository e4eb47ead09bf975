//! Drive type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of backend a drive lives on. Adapters are registered per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "drive_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriveType {
    /// S3-compatible object storage bucket.
    ObjectStorage,
    /// Local filesystem directory.
    Local,
    /// Network share mounted into the local filesystem (SMB/NFS).
    NetworkShare,
}

impl DriveType {
    /// All known drive types.
    pub const ALL: [DriveType; 3] = [Self::ObjectStorage, Self::Local, Self::NetworkShare];

    /// Return the drive type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectStorage => "object_storage",
            Self::Local => "local",
            Self::NetworkShare => "network_share",
        }
    }

    /// Whether drives of this type are addressed through a mounted directory.
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Local | Self::NetworkShare)
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriveType {
    type Err = studystore_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "object_storage" | "s3" => Ok(Self::ObjectStorage),
            "local" => Ok(Self::Local),
            "network_share" | "smb" => Ok(Self::NetworkShare),
            _ => Err(studystore_core::AppError::validation(format!(
                "Invalid drive type: '{s}'. Expected one of: object_storage, local, network_share"
            ))),
        }
    }
}
