//! Adapter registry: routes each drive type to the adapter that serves it.

use std::collections::HashMap;
use std::sync::Arc;

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_entity::drive::{Drive, DriveType};

use crate::adapter::StorageAdapter;
use crate::filesystem::FilesystemAdapter;
use crate::object::ObjectStorageAdapter;
use crate::resolver::ClientResolver;

/// Immutable drive type to adapter map.
///
/// Built once at start-up with [`AdapterRegistry::builder`] and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<DriveType, Arc<dyn StorageAdapter>>,
}

/// Builder for [`AdapterRegistry`].
#[derive(Debug, Default)]
pub struct AdapterRegistryBuilder {
    adapters: HashMap<DriveType, Arc<dyn StorageAdapter>>,
}

impl AdapterRegistryBuilder {
    /// Register `adapter` for `drive_type`, replacing any earlier one.
    ///
    /// Fails if the adapter does not declare support for the type.
    pub fn register(mut self, drive_type: DriveType, adapter: Arc<dyn StorageAdapter>) -> AppResult<Self> {
        if !adapter.supports(drive_type) {
            return Err(AppError::configuration(format!(
                "Adapter '{}' cannot serve {drive_type} drives",
                adapter.name()
            )));
        }
        tracing::debug!(%drive_type, adapter = adapter.name(), "Registered storage adapter");
        self.adapters.insert(drive_type, adapter);
        Ok(self)
    }

    /// Finish building.
    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry {
            adapters: self.adapters,
        }
    }
}

impl AdapterRegistry {
    /// Start an empty registry.
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    /// Registry with the built-in adapters for every drive type: object
    /// storage through `resolver`, local and network-share drives through
    /// the filesystem adapter.
    pub fn standard(resolver: Arc<dyn ClientResolver>) -> AppResult<Self> {
        let filesystem: Arc<dyn StorageAdapter> = Arc::new(FilesystemAdapter::new());
        Ok(Self::builder()
            .register(
                DriveType::ObjectStorage,
                Arc::new(ObjectStorageAdapter::new(resolver)),
            )?
            .register(DriveType::Local, filesystem.clone())?
            .register(DriveType::NetworkShare, filesystem)?
            .build())
    }

    /// Process registry built from configuration, with S3 clients for every
    /// configured integration.
    #[cfg(feature = "s3")]
    pub async fn from_config(config: &studystore_core::config::StorageConfig) -> AppResult<Self> {
        let integrations = crate::resolver::IntegrationRegistry::from_config(config).await?;
        Self::standard(Arc::new(integrations))
    }

    /// The adapter serving `drive_type`.
    pub fn lookup(&self, drive_type: DriveType) -> AppResult<Arc<dyn StorageAdapter>> {
        self.adapters.get(&drive_type).cloned().ok_or_else(|| {
            AppError::unsupported_drive_type(format!(
                "No storage adapter registered for {drive_type} drives"
            ))
        })
    }

    /// The adapter serving `drive`.
    pub fn for_drive(&self, drive: &Drive) -> AppResult<Arc<dyn StorageAdapter>> {
        self.lookup(drive.drive_type)
    }

    /// Drive types that have an adapter, in declaration order.
    pub fn registered_types(&self) -> Vec<DriveType> {
        DriveType::ALL
            .iter()
            .copied()
            .filter(|t| self.adapters.contains_key(t))
            .collect()
    }
}
