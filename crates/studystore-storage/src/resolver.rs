//! Resolution of object-storage drives to configured clients.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_entity::drive::Drive;

use crate::object::ObjectStoreClient;

/// Supplies the object-store client for a drive's integration.
#[async_trait]
pub trait ClientResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Return the client for `drive`.
    ///
    /// Fails with `NotFound` if the drive's integration is unknown and with
    /// `Validation` if the drive is not an object-storage drive.
    async fn client_for(&self, drive: &Drive) -> AppResult<Arc<dyn ObjectStoreClient>>;
}

/// Integration name to client map, built once at startup.
#[derive(Debug, Default, Clone)]
pub struct IntegrationRegistry {
    clients: HashMap<String, Arc<dyn ObjectStoreClient>>,
}

impl IntegrationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client under `name`, replacing any previous one.
    pub fn with_client(mut self, name: impl Into<String>, client: Arc<dyn ObjectStoreClient>) -> Self {
        self.clients.insert(name.into(), client);
        self
    }

    /// Configured integration names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build S3 clients for every configured integration.
    #[cfg(feature = "s3")]
    pub async fn from_config(config: &studystore_core::config::StorageConfig) -> AppResult<Self> {
        use validator::Validate;

        let timeout = std::time::Duration::from_secs(config.operation_timeout_seconds);
        let mut registry = Self::new();
        for integration in &config.integrations {
            integration.validate()?;
            let client = crate::object::s3::S3ObjectStore::from_integration(integration, timeout).await;
            registry = registry.with_client(integration.name.clone(), Arc::new(client));
        }
        tracing::info!(count = registry.clients.len(), "Object storage integrations configured");
        Ok(registry)
    }
}

#[async_trait]
impl ClientResolver for IntegrationRegistry {
    async fn client_for(&self, drive: &Drive) -> AppResult<Arc<dyn ObjectStoreClient>> {
        let (_, integration) = drive.bucket().ok_or_else(|| {
            AppError::validation(format!(
                "Drive '{}' is a {} drive, not object storage",
                drive.display_name, drive.drive_type
            ))
        })?;
        self.clients.get(integration).cloned().ok_or_else(|| {
            AppError::not_found(format!(
                "No object storage integration named '{integration}' (drive '{}')",
                drive.display_name
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use studystore_core::error::ErrorKind;
    use studystore_core::types::DriveId;
    use studystore_entity::drive::{DriveDetails, DriveType};

    use super::*;
    use crate::object::InMemoryObjectStore;

    fn drive(drive_type: DriveType, details: DriveDetails) -> Drive {
        Drive {
            id: DriveId::new(),
            drive_type,
            display_name: "test".into(),
            root_path: String::new(),
            details,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_resolves_known_integration() {
        let registry = IntegrationRegistry::new()
            .with_client("minio", Arc::new(InMemoryObjectStore::with_bucket("bkt")));
        let d = drive(
            DriveType::ObjectStorage,
            DriveDetails::ObjectStorage {
                bucket: "bkt".into(),
                integration: "minio".into(),
            },
        );
        assert!(registry.client_for(&d).await.is_ok());
        assert_eq!(registry.names(), vec!["minio"]);
    }

    #[tokio::test]
    async fn test_unknown_integration_and_wrong_drive_type() {
        let registry = IntegrationRegistry::new();
        let d = drive(
            DriveType::ObjectStorage,
            DriveDetails::ObjectStorage {
                bucket: "bkt".into(),
                integration: "missing".into(),
            },
        );
        let err = registry.client_for(&d).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let d = drive(
            DriveType::Local,
            DriveDetails::Filesystem {
                mount_path: "/data".into(),
            },
        );
        let err = registry.client_for(&d).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
