//! Integration tests for entity folder creation, registration and lookup.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use studystore_core::config::FolderFailurePolicy;
use studystore_core::error::ErrorKind;
use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId};
use studystore_database::{InMemoryMetadataStore, MetadataStore};
use studystore_entity::association::{EntityFolder, EntityRef};
use studystore_entity::drive::{Drive, DriveType, NewDrive};
use studystore_entity::folder::{FolderDetails, FolderPolicy, FolderRecord, NewFolderRecord};
use studystore_service::{CreateFolderOptions, FolderDraft, StorageEntity, StorageOrchestrator};
use studystore_storage::{AdapterRegistry, FilesystemAdapter, IntegrationRegistry, ObjectStoreClient};

use helpers::{BUCKET, TestApp, program, root_policy, study};

#[tokio::test]
async fn test_study_folder_created_under_program() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    let program_folder = app.program_folder(&prog1, &root).await;
    assert_eq!(program_folder.path, "programs/prog1/");

    let study = study("study-001", &prog1);
    let folder = app
        .orchestrator
        .create_folder_for(&study, &program_folder, &CreateFolderOptions::primary())
        .await
        .unwrap();

    assert_eq!(folder.path, "programs/prog1/study-001/");
    assert_eq!(folder.name, "study-001");
    assert_eq!(folder.drive_id, app.bucket_drive.id);
    assert!(folder.policy.write_enabled);
    assert!(matches!(
        &folder.details,
        FolderDetails::ObjectStorage { key, .. } if key == "programs/prog1/study-001/"
    ));
    assert!(
        app.orchestrator
            .folder_exists(app.bucket_drive.id, &folder.path)
            .await
            .unwrap()
    );

    let primary = app
        .orchestrator
        .find_primary_folder(study.reference())
        .await
        .unwrap();
    assert_eq!(primary.id, folder.id);
}

#[tokio::test]
async fn test_create_folder_twice_reuses_record() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");

    let first = app.program_folder(&prog1, &root).await;
    let mutations = app.objects.mutation_count();
    let second = app.program_folder(&prog1, &root).await;

    assert_eq!(first.id, second.id);
    assert_eq!(app.objects.mutation_count(), mutations);
    assert_eq!(
        app.store.list_folders(app.bucket_drive.id).await.unwrap().len(),
        2
    );
    let folders = app
        .orchestrator
        .list_entity_folders(prog1.reference())
        .await
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].is_primary);
}

#[tokio::test]
async fn test_display_name_option_overrides_listing_name() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let options = CreateFolderOptions {
        primary: false,
        display_name: Some("Program One".into()),
    };
    let folder = app
        .orchestrator
        .create_folder_for(&program("prog1"), &root, &options)
        .await
        .unwrap();
    assert_eq!(folder.name, "Program One");
    assert_eq!(folder.path, "programs/prog1/");

    let blank = CreateFolderOptions {
        primary: false,
        display_name: Some("   ".into()),
    };
    let folder = app
        .orchestrator
        .create_folder_for(&program("prog2"), &root, &blank)
        .await
        .unwrap();
    assert_eq!(folder.name, "prog2");
}

#[tokio::test]
async fn test_read_only_parent_rejected_without_backend_calls() {
    let app = TestApp::new().await;
    app.objects
        .put_object(BUCKET, "archive/", bytes::Bytes::new())
        .await
        .unwrap();
    let archive = app
        .register(&app.bucket_drive, "archive/", FolderPolicy::default())
        .await;
    let requests = app.objects.request_count();

    let err = app
        .orchestrator
        .create_folder_for(&program("prog1"), &archive, &CreateFolderOptions::primary())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InsufficientPrivileges);
    assert_eq!(app.objects.request_count(), requests);
    assert!(
        app.orchestrator
            .list_entity_folders(program("prog1").reference())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_register_folder_requires_physical_folder() {
    let app = TestApp::new().await;
    let err = app
        .orchestrator
        .register_folder(
            app.bucket_drive.id,
            &FolderDraft {
                path: "nowhere/".into(),
                name: Some("Nowhere".into()),
                policy: root_policy(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(app.store.list_folders(app.bucket_drive.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_path_conflicts() {
    let app = TestApp::new().await;
    app.programs_root().await;
    let err = app
        .orchestrator
        .register_folder(
            app.bucket_drive.id,
            &FolderDraft {
                path: "programs".into(),
                name: None,
                policy: root_policy(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_unregistered_drive_type() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let registry = AdapterRegistry::builder()
        .register(DriveType::Local, Arc::new(FilesystemAdapter::new()))
        .unwrap()
        .build();
    let orchestrator = StorageOrchestrator::new(app.store.clone(), Arc::new(registry));

    let err = orchestrator
        .create_folder_for(&program("prog1"), &root, &CreateFolderOptions::primary())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnsupportedDriveType);

    let err = orchestrator.browse(app.bucket_drive.id, "programs/").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnsupportedDriveType);
}

#[tokio::test]
async fn test_provision_failure_policies() {
    let abort = TestApp::new().await;
    let root = abort.programs_root().await;
    abort.objects.set_unavailable(true);
    let err = abort
        .orchestrator
        .provision_folder(&program("prog1"), &root)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::StorageBackend);

    let lenient = TestApp::with_policy(FolderFailurePolicy::BestEffort).await;
    let root = lenient.programs_root().await;
    lenient.objects.set_unavailable(true);
    let prog1 = program("prog1");
    let outcome = lenient.orchestrator.provision_folder(&prog1, &root).await.unwrap();
    assert!(outcome.is_none());
    assert!(
        lenient
            .orchestrator
            .find_primary_folder(prog1.reference())
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_filesystem_drive_folders() {
    let app = TestApp::new().await;
    std::fs::create_dir_all(app.scratch.path().join("programs")).unwrap();
    let root = app.register(&app.disk_drive, "programs", root_policy()).await;
    assert_eq!(root.details, FolderDetails::Filesystem);

    let prog1 = program("prog1");
    let folder = app.program_folder(&prog1, &root).await;
    assert_eq!(folder.path, "programs/prog1/");
    assert!(app.scratch.path().join("programs/prog1").is_dir());

    let listing = app.orchestrator.browse(app.disk_drive.id, "programs").await.unwrap();
    assert_eq!(listing.folders, vec!["prog1"]);
}

#[tokio::test]
async fn test_deactivate_requires_delete_flag() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let folder = app.program_folder(&program("prog1"), &root).await;

    let err = app.orchestrator.deactivate_folder(folder.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InsufficientPrivileges);

    app.objects
        .put_object(BUCKET, "scratch/", bytes::Bytes::new())
        .await
        .unwrap();
    let disposable = app
        .register(
            &app.bucket_drive,
            "scratch",
            FolderPolicy {
                delete_enabled: true,
                ..FolderPolicy::default()
            },
        )
        .await;
    app.orchestrator.deactivate_folder(disposable.id).await.unwrap();
    let reloaded = app.orchestrator.find_folder(disposable.id).await.unwrap();
    assert!(!reloaded.active);
    assert!(app.objects.keys(BUCKET).await.contains(&"scratch/".to_string()));
}

#[tokio::test]
async fn test_secondary_relink_keeps_primary() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    let primary = app.program_folder(&prog1, &root).await;

    let again = app
        .orchestrator
        .create_folder_for(&prog1, &root, &CreateFolderOptions::default())
        .await
        .unwrap();
    assert_eq!(again.id, primary.id);
    let found = app
        .orchestrator
        .find_primary_folder(prog1.reference())
        .await
        .unwrap();
    assert_eq!(found.id, primary.id);

    let attached = app
        .orchestrator
        .attach_folder(prog1.reference(), primary.id, false)
        .await
        .unwrap();
    assert!(attached.is_primary);
    let folders = app
        .orchestrator
        .list_entity_folders(prog1.reference())
        .await
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].is_primary);
}

#[tokio::test]
async fn test_deactivated_record_is_not_relinked() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let retired = app.program_folder(&program("prog1"), &root).await;
    app.store.set_folder_active(retired.id, false).await.unwrap();
    let requests = app.objects.request_count();

    let successor = program("prog1");
    let err = app
        .orchestrator
        .create_folder_for(&successor, &root, &CreateFolderOptions::primary())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.objects.request_count(), requests);
    assert!(
        app.orchestrator
            .list_entity_folders(successor.reference())
            .await
            .unwrap()
            .is_empty()
    );
}

/// Metadata store where another request saves the same entity folder
/// between the path lookup and the insert.
#[derive(Debug)]
struct InterleavedStore {
    inner: Arc<InMemoryMetadataStore>,
    raced: AtomicBool,
}

#[async_trait]
impl MetadataStore for InterleavedStore {
    async fn find_drive(&self, id: DriveId) -> AppResult<Option<Drive>> {
        self.inner.find_drive(id).await
    }

    async fn find_drive_by_name(&self, name: &str) -> AppResult<Option<Drive>> {
        self.inner.find_drive_by_name(name).await
    }

    async fn list_drives(&self, active_only: bool) -> AppResult<Vec<Drive>> {
        self.inner.list_drives(active_only).await
    }

    async fn save_drive(&self, drive: &NewDrive) -> AppResult<Drive> {
        self.inner.save_drive(drive).await
    }

    async fn set_drive_active(&self, id: DriveId, active: bool) -> AppResult<()> {
        self.inner.set_drive_active(id, active).await
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderRecord>> {
        self.inner.find_folder(id).await
    }

    async fn find_folder_by_path(&self, drive_id: DriveId, path: &str) -> AppResult<Option<FolderRecord>> {
        self.inner.find_folder_by_path(drive_id, path).await
    }

    async fn list_folders(&self, drive_id: DriveId) -> AppResult<Vec<FolderRecord>> {
        self.inner.list_folders(drive_id).await
    }

    async fn save_folder(&self, folder: &NewFolderRecord) -> AppResult<FolderRecord> {
        self.inner.save_folder(folder).await
    }

    async fn save_entity_folder(
        &self,
        entity: EntityRef,
        folder: &NewFolderRecord,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.save_entity_folder(entity, folder, primary).await?;
        }
        self.inner.save_entity_folder(entity, folder, primary).await
    }

    async fn link_folder(&self, entity: EntityRef, folder_id: FolderId, primary: bool) -> AppResult<EntityFolder> {
        self.inner.link_folder(entity, folder_id, primary).await
    }

    async fn find_entity_folders(&self, entity: EntityRef) -> AppResult<Vec<EntityFolder>> {
        self.inner.find_entity_folders(entity).await
    }

    async fn find_primary_folder(&self, entity: EntityRef) -> AppResult<Option<FolderRecord>> {
        self.inner.find_primary_folder(entity).await
    }

    async fn set_folder_active(&self, id: FolderId, active: bool) -> AppResult<()> {
        self.inner.set_folder_active(id, active).await
    }
}

#[tokio::test]
async fn test_concurrent_insert_links_existing_record() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let store = Arc::new(InterleavedStore {
        inner: app.store.clone(),
        raced: AtomicBool::new(false),
    });
    let integrations = IntegrationRegistry::new().with_client("memory", app.objects.clone());
    let registry = AdapterRegistry::standard(Arc::new(integrations)).unwrap();
    let orchestrator = StorageOrchestrator::new(store, Arc::new(registry))
        .with_namer(|entity: &StorageEntity| entity.code.clone());

    let prog1 = program("prog1");
    let folder = orchestrator
        .create_folder_for(&prog1, &root, &CreateFolderOptions::primary())
        .await
        .unwrap();
    assert_eq!(folder.path, "programs/prog1/");

    let stored = app
        .store
        .find_folder_by_path(app.bucket_drive.id, "programs/prog1/")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(folder.id, stored.id);
    let folders = app.orchestrator.list_entity_folders(prog1.reference()).await.unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].is_primary);
}
