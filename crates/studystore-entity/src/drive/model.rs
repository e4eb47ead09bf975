//! Drive entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use studystore_core::types::DriveId;

use super::details::DriveDetails;
use super::drive_type::DriveType;

/// A registered storage backend instance.
///
/// Drives are created once at configuration time and are immutable except
/// for the `active` flag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Drive {
    /// Unique drive identifier.
    pub id: DriveId,
    /// Backend type, used to resolve the adapter.
    pub drive_type: DriveType,
    /// Human-readable name.
    pub display_name: String,
    /// Root path of the drive.
    pub root_path: String,
    /// Backend-specific details.
    #[sqlx(json)]
    pub details: DriveDetails,
    /// Whether the drive accepts new folders.
    pub active: bool,
    /// When the drive was registered.
    pub created_at: DateTime<Utc>,
    /// When the drive was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Drive {
    /// Bucket and integration names, if this is an object-storage drive.
    pub fn bucket(&self) -> Option<(&str, &str)> {
        match &self.details {
            DriveDetails::ObjectStorage {
                bucket,
                integration,
            } => Some((bucket.as_str(), integration.as_str())),
            DriveDetails::Filesystem { .. } => None,
        }
    }

    /// Mount path, if this is a filesystem drive.
    pub fn mount_path(&self) -> Option<&str> {
        match &self.details {
            DriveDetails::Filesystem { mount_path } => Some(mount_path.as_str()),
            DriveDetails::ObjectStorage { .. } => None,
        }
    }
}

/// Data required to register a new drive.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_details"))]
pub struct NewDrive {
    /// Backend type.
    pub drive_type: DriveType,
    /// Human-readable name.
    #[validate(length(min = 1, max = 255))]
    pub display_name: String,
    /// Root path of the drive.
    pub root_path: String,
    /// Backend-specific details; must match `drive_type`.
    pub details: DriveDetails,
}

fn validate_details(drive: &NewDrive) -> Result<(), ValidationError> {
    if drive.details.matches(drive.drive_type) {
        Ok(())
    } else {
        Err(ValidationError::new("details_do_not_match_drive_type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_must_match_type() {
        let drive = NewDrive {
            drive_type: DriveType::ObjectStorage,
            display_name: "Bucket".into(),
            root_path: String::new(),
            details: DriveDetails::Filesystem {
                mount_path: "/data".into(),
            },
        };
        assert!(drive.validate().is_err());

        let drive = NewDrive {
            drive_type: DriveType::NetworkShare,
            display_name: "Share".into(),
            root_path: "/mnt/share".into(),
            details: DriveDetails::Filesystem {
                mount_path: "/mnt/share".into(),
            },
        };
        assert!(drive.validate().is_ok());
    }

    #[test]
    fn test_details_serialize_tagged() {
        let details = DriveDetails::ObjectStorage {
            bucket: "bkt".into(),
            integration: "aws-main".into(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["type"], "object_storage");
        assert_eq!(json["bucket"], "bkt");
    }
}
