//! Storage drive and integration configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Per-operation timeout applied by object-storage clients, in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_seconds: u64,
    /// What entity provisioning does when its storage folder cannot be created.
    #[serde(default)]
    pub folder_failure_policy: FolderFailurePolicy,
    /// Named object-storage integrations (credentials and endpoints).
    #[serde(default)]
    pub integrations: Vec<IntegrationConfig>,
    /// Drives to register in the metadata store on `drive sync`.
    #[serde(default)]
    pub drives: Vec<DriveConfig>,
}

/// Policy applied when a storage folder cannot be created while provisioning
/// a business entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderFailurePolicy {
    /// The failure is returned to the caller.
    #[default]
    Abort,
    /// The failure is logged and the entity proceeds without a folder;
    /// a later repair creates it.
    BestEffort,
}

/// An S3-compatible object-storage integration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntegrationConfig {
    /// Integration name referenced by object-storage drives.
    #[validate(length(min = 1))]
    pub name: String,
    /// Endpoint URL for non-AWS services such as MinIO. Empty for AWS.
    #[serde(default)]
    pub endpoint: String,
    /// Region name.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID. Empty to use the ambient AWS credential chain.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style bucket addressing.
    #[serde(default)]
    pub force_path_style: bool,
}

/// A drive declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DriveConfig {
    /// Display name; also the key used to match already-registered drives.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Drive type: `object_storage`, `local` or `network_share`.
    pub drive_type: String,
    /// Root path of the drive (informational for object storage).
    #[serde(default)]
    pub root_path: String,
    /// Bucket name for object-storage drives.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Integration name for object-storage drives.
    #[serde(default)]
    pub integration: Option<String>,
    /// Mount path for filesystem drives.
    #[serde(default)]
    pub mount_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            operation_timeout_seconds: default_operation_timeout(),
            folder_failure_policy: FolderFailurePolicy::default(),
            integrations: Vec::new(),
            drives: Vec::new(),
        }
    }
}

fn default_operation_timeout() -> u64 {
    30
}

fn default_region() -> String {
    "us-east-1".to_string()
}
