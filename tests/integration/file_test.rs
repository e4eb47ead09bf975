//! Integration tests for folder-scoped file access.

mod helpers;

use bytes::Bytes;

use studystore_core::error::ErrorKind;
use studystore_entity::folder::FolderPolicy;
use studystore_storage::ObjectStoreClient;

use helpers::{BUCKET, TestApp, program, root_policy};

#[tokio::test]
async fn test_save_and_fetch_in_entity_folder() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let folder = app.program_folder(&program("prog1"), &root).await;

    let saved = app
        .orchestrator
        .save_file(folder.id, "", "protocol.pdf", Bytes::from_static(b"%PDF-1.7"))
        .await
        .unwrap();
    assert_eq!(saved.path, "programs/prog1/protocol.pdf");
    assert_eq!(saved.name, "protocol.pdf");
    assert_eq!(saved.size, 8);

    let content = app
        .orchestrator
        .fetch_file(folder.id, "programs/prog1/protocol.pdf")
        .await
        .unwrap();
    assert_eq!(&content[..], b"%PDF-1.7");

    let found = app
        .orchestrator
        .find_file(app.bucket_drive.id, "programs/prog1/protocol.pdf")
        .await
        .unwrap();
    assert_eq!(found, saved);
    assert!(
        app.orchestrator
            .file_exists(app.bucket_drive.id, "programs/prog1/protocol.pdf")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_browse_lists_files_and_subfolders() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let folder = app.program_folder(&program("prog1"), &root).await;
    app.orchestrator
        .save_file(folder.id, "programs/prog1/raw", "run-1.csv", Bytes::from_static(b"a,b"))
        .await
        .unwrap();
    app.orchestrator
        .save_file(folder.id, "", "summary.txt", Bytes::from_static(b"ok"))
        .await
        .unwrap();

    let listing = app
        .orchestrator
        .browse(app.bucket_drive.id, "programs/prog1")
        .await
        .unwrap();
    assert_eq!(listing.path, "programs/prog1/");
    assert_eq!(listing.folders, vec!["raw"]);
    let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["summary.txt"]);
}

#[tokio::test]
async fn test_folder_path_is_not_a_file() {
    let app = TestApp::new().await;
    app.programs_root().await;

    let err = app
        .orchestrator
        .find_file(app.bucket_drive.id, "programs/")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(
        !app.orchestrator
            .file_exists(app.bucket_drive.id, "programs/")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_read_only_folder_rejects_upload() {
    let app = TestApp::new().await;
    app.objects
        .put_object(BUCKET, "published/", Bytes::new())
        .await
        .unwrap();
    let published = app
        .register(&app.bucket_drive, "published", FolderPolicy::default())
        .await;
    let requests = app.objects.request_count();

    let err = app
        .orchestrator
        .save_file(published.id, "", "report.pdf", Bytes::from_static(b"x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InsufficientPrivileges);
    assert_eq!(app.objects.request_count(), requests);
}

#[tokio::test]
async fn test_fetch_outside_folder_rejected() {
    let app = TestApp::new().await;
    let root = app.programs_root().await;
    let folder = app.program_folder(&program("prog1"), &root).await;
    app.objects
        .put_object(BUCKET, "programs/prog2/secret.txt", Bytes::from_static(b"no"))
        .await
        .unwrap();

    let err = app
        .orchestrator
        .fetch_file(folder.id, "programs/prog2/secret.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .orchestrator
        .fetch_file(folder.id, "programs/prog1/missing.txt")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_filesystem_file_round_trip() {
    let app = TestApp::new().await;
    std::fs::create_dir_all(app.scratch.path().join("lab")).unwrap();
    let lab = app.register(&app.disk_drive, "lab", root_policy()).await;

    let saved = app
        .orchestrator
        .save_file(lab.id, "lab/plates", "p1.tsv", Bytes::from_static(b"1\t2"))
        .await
        .unwrap();
    assert_eq!(saved.path, "lab/plates/p1.tsv");
    assert!(app.scratch.path().join("lab/plates/p1.tsv").is_file());

    let content = app.orchestrator.fetch_file(lab.id, "lab/plates/p1.tsv").await.unwrap();
    assert_eq!(&content[..], b"1\t2");
}
