//! # studystore-service
//!
//! Storage orchestration for StudyStore. The [`StorageOrchestrator`] is the
//! facade the surrounding application calls: it resolves drives and
//! adapters, creates and registers folders for business entities, gives
//! folder-scoped file access and repairs drift between folder records and
//! physical storage.
//!
//! Dependencies are injected at construction time as `Arc` references.

pub mod bootstrap;
pub mod naming;
pub mod orchestrator;

pub use bootstrap::seed_drives;
pub use naming::{FolderNamer, SlugNamer, StorageEntity};
pub use orchestrator::{CreateFolderOptions, FolderDraft, RepairOutcome, StorageOrchestrator};
