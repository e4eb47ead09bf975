//! Integration tests for repairing entity folders.

mod helpers;

use studystore_core::error::ErrorKind;
use studystore_database::MetadataStore;
use studystore_service::{CreateFolderOptions, RepairOutcome};

use helpers::{BUCKET, TestApp, program, study};

#[tokio::test]
async fn test_repair_healthy_folder_changes_nothing() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    let folder = app.program_folder(&prog1, &root).await;

    let object_writes = app.objects.mutation_count();
    let metadata_writes = app.store.write_count();

    let outcome = app.orchestrator.repair(&prog1).await.unwrap();
    assert!(matches!(outcome, RepairOutcome::Verified(ref f) if f.id == folder.id));
    assert!(!outcome.mutated());
    assert_eq!(app.objects.mutation_count(), object_writes);
    assert_eq!(app.store.write_count(), metadata_writes);
}

#[tokio::test]
async fn test_repair_recreates_missing_marker() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    let folder = app.program_folder(&prog1, &root).await;
    assert!(app.objects.remove_object(BUCKET, "programs/prog1/").await);

    let outcome = app.orchestrator.repair(&prog1).await.unwrap();
    assert!(matches!(outcome, RepairOutcome::Recreated(_)));
    assert_eq!(outcome.folder().id, folder.id);
    assert!(
        app.objects
            .keys(BUCKET)
            .await
            .contains(&"programs/prog1/".to_string())
    );

    let writes = app.objects.mutation_count();
    let again = app.orchestrator.repair(&prog1).await.unwrap();
    assert!(matches!(again, RepairOutcome::Verified(_)));
    assert_eq!(app.objects.mutation_count(), writes);
}

#[tokio::test]
async fn test_repair_creates_missing_primary_under_parent() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    app.program_folder(&prog1, &root).await;
    let study = study("study-001", &prog1);

    let outcome = app.orchestrator.repair(&study).await.unwrap();
    let RepairOutcome::Created(created) = &outcome else {
        panic!("expected a created folder, got {outcome:?}");
    };
    assert_eq!(created.path, "programs/prog1/study-001/");

    let primary = app
        .orchestrator
        .find_primary_folder(study.reference())
        .await
        .unwrap();
    assert_eq!(primary.id, created.id);

    let again = app.orchestrator.repair(&study).await.unwrap();
    assert!(matches!(again, RepairOutcome::Verified(ref f) if f.id == created.id));
}

#[tokio::test]
async fn test_repair_links_existing_record_as_primary() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    let program_folder = app.program_folder(&prog1, &root).await;
    let study = study("study-001", &prog1);

    let secondary = app
        .orchestrator
        .create_folder_for(&study, &program_folder, &CreateFolderOptions::default())
        .await
        .unwrap();

    let outcome = app.orchestrator.repair(&study).await.unwrap();
    assert!(matches!(outcome, RepairOutcome::Created(ref f) if f.id == secondary.id));
    let folders = app
        .orchestrator
        .list_entity_folders(study.reference())
        .await
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].is_primary);
}

#[tokio::test]
async fn test_repair_without_parent_folder_is_not_found() {
    let app = TestApp::new().await;
    let prog1 = program("prog1");

    let err = app.orchestrator.repair(&prog1).await.unwrap_err();
    assert!(err.is_not_found());

    let err = app
        .orchestrator
        .repair(&study("study-001", &prog1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_repair_surfaces_backend_failure() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    app.program_folder(&prog1, &root).await;
    app.objects.set_unavailable(true);

    let err = app.orchestrator.repair(&prog1).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::StorageBackend);

    app.objects.set_unavailable(false);
    let outcome = app.orchestrator.repair(&prog1).await.unwrap();
    assert!(matches!(outcome, RepairOutcome::Verified(_)));
}

#[tokio::test]
async fn test_repair_reports_deactivated_primary() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let prog1 = program("prog1");
    let folder = app.program_folder(&prog1, &root).await;
    app.store.set_folder_active(folder.id, false).await.unwrap();
    assert!(app.objects.remove_object(BUCKET, "programs/prog1/").await);
    let requests = app.objects.request_count();

    let outcome = app.orchestrator.repair(&prog1).await.unwrap();
    assert!(matches!(outcome, RepairOutcome::Deactivated(ref f) if f.id == folder.id));
    assert!(!outcome.mutated());
    assert_eq!(app.objects.request_count(), requests);
}
