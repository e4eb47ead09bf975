//! # studystore-entity
//!
//! Domain models for StudyStore. Persisted records (`Drive`,
//! `FolderRecord`, `EntityFolder`) carry their backend-specific details as
//! tagged enums keyed by drive type, so each adapter matches its own variant.
//! Transient values (`FolderListing`, `FileDescriptor`) are produced fresh by
//! adapters and never cached.

pub mod association;
pub mod drive;
pub mod folder;

pub use association::{EntityFolder, EntityKind, EntityRef};
pub use drive::{Drive, DriveDetails, DriveType, NewDrive};
pub use folder::{FileDescriptor, FolderDetails, FolderListing, FolderPolicy, FolderRecord, NewFolderRecord};
