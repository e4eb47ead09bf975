//! Shared test helpers for integration tests.
//!
//! Every test runs against the in-memory metadata store, an in-memory object
//! store holding bucket `bkt`, and a temporary directory for filesystem
//! drives.
#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use studystore_core::config::FolderFailurePolicy;
use studystore_core::types::EntityId;
use studystore_database::{InMemoryMetadataStore, MetadataStore};
use studystore_entity::association::EntityKind;
use studystore_entity::drive::{Drive, DriveDetails, DriveType, NewDrive};
use studystore_entity::folder::{FolderPolicy, FolderRecord};
use studystore_service::{CreateFolderOptions, FolderDraft, StorageEntity, StorageOrchestrator};
use studystore_storage::{AdapterRegistry, InMemoryObjectStore, IntegrationRegistry, ObjectStoreClient};

/// Bucket of the object-storage drive.
pub const BUCKET: &str = "bkt";

/// Test application context.
pub struct TestApp {
    /// Orchestrator under test.
    pub orchestrator: StorageOrchestrator,
    /// Metadata store, for direct inspection.
    pub store: Arc<InMemoryMetadataStore>,
    /// Object store behind the object-storage drive.
    pub objects: Arc<InMemoryObjectStore>,
    /// Object-storage drive on bucket [`BUCKET`].
    pub bucket_drive: Drive,
    /// Local drive rooted in [`TestApp::scratch`].
    pub disk_drive: Drive,
    /// Temporary directory backing the local drive.
    pub scratch: TempDir,
}

impl TestApp {
    /// Create a test application with the `abort` failure policy.
    pub async fn new() -> Self {
        Self::with_policy(FolderFailurePolicy::Abort).await
    }

    /// Create a test application with the given failure policy.
    ///
    /// Folder names are the entity code verbatim, so a program coded
    /// `prog1` gets folder `prog1`.
    pub async fn with_policy(policy: FolderFailurePolicy) -> Self {
        let store = Arc::new(InMemoryMetadataStore::new());
        let objects = Arc::new(InMemoryObjectStore::with_bucket(BUCKET));
        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");

        let integrations = IntegrationRegistry::new().with_client("memory", objects.clone());
        let registry = AdapterRegistry::standard(Arc::new(integrations)).expect("Failed to build registry");

        let bucket_drive = store
            .save_drive(&NewDrive {
                drive_type: DriveType::ObjectStorage,
                display_name: "Research bucket".into(),
                root_path: String::new(),
                details: DriveDetails::ObjectStorage {
                    bucket: BUCKET.into(),
                    integration: "memory".into(),
                },
            })
            .await
            .expect("Failed to save bucket drive");

        let mount = scratch.path().display().to_string();
        let disk_drive = store
            .save_drive(&NewDrive {
                drive_type: DriveType::Local,
                display_name: "Scratch disk".into(),
                root_path: mount.clone(),
                details: DriveDetails::Filesystem { mount_path: mount },
            })
            .await
            .expect("Failed to save disk drive");

        let orchestrator = StorageOrchestrator::new(store.clone(), Arc::new(registry))
            .with_namer(|entity: &StorageEntity| entity.code.clone())
            .with_failure_policy(policy);

        Self {
            orchestrator,
            store,
            objects,
            bucket_drive,
            disk_drive,
            scratch,
        }
    }

    /// Register `programs/` on the bucket drive as a writable study root.
    pub async fn programs_root(&self) -> FolderRecord {
        self.objects
            .put_object(BUCKET, "programs/", Bytes::new())
            .await
            .expect("Failed to seed programs marker");
        self.register(&self.bucket_drive, "programs", root_policy()).await
    }

    /// Register an existing folder with the given policy.
    pub async fn register(&self, drive: &Drive, path: &str, policy: FolderPolicy) -> FolderRecord {
        self.orchestrator
            .register_folder(
                drive.id,
                &FolderDraft {
                    path: path.into(),
                    name: None,
                    policy,
                },
            )
            .await
            .expect("Failed to register folder")
    }

    /// Create the primary folder of a program below `root`.
    pub async fn program_folder(&self, program: &StorageEntity, root: &FolderRecord) -> FolderRecord {
        self.orchestrator
            .create_folder_for(program, root, &CreateFolderOptions::primary())
            .await
            .expect("Failed to create program folder")
    }
}

/// Policy of a registered study root.
pub fn root_policy() -> FolderPolicy {
    FolderPolicy {
        browser_root: true,
        study_root: true,
        write_enabled: true,
        delete_enabled: false,
    }
}

/// A program entity with the given code.
pub fn program(code: &str) -> StorageEntity {
    StorageEntity::new(EntityKind::Program, EntityId::new(), code, format!("Program {code}"))
}

/// A study entity belonging to `program`.
pub fn study(code: &str, program: &StorageEntity) -> StorageEntity {
    StorageEntity::new(EntityKind::Study, EntityId::new(), code, format!("Study {code}"))
        .with_parent(program.reference())
}
