//! The storage orchestrator facade and its request types.

pub mod repair;
pub mod service;

use serde::{Deserialize, Serialize};
use validator::Validate;

use studystore_entity::folder::FolderPolicy;

pub use repair::RepairOutcome;
pub use service::StorageOrchestrator;

/// Options for [`StorageOrchestrator::create_folder_for`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderOptions {
    /// Link the folder as the entity's primary folder.
    pub primary: bool,
    /// Record display name. The physical folder name is still chosen by
    /// the namer; blank means "use the folder name".
    pub display_name: Option<String>,
}

impl CreateFolderOptions {
    /// Options for the entity's primary folder.
    pub fn primary() -> Self {
        Self {
            primary: true,
            display_name: None,
        }
    }
}

/// A request to register an existing physical folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FolderDraft {
    /// Drive-relative path of the folder.
    #[validate(length(min = 1))]
    pub path: String,
    /// Record display name; blank means "use the folder name".
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Policy flags of the new record.
    pub policy: FolderPolicy,
}

/// `name` when it has visible characters, otherwise `fallback`.
pub(crate) fn display_name_or(name: Option<&str>, fallback: &str) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback.to_string(),
    }
}
