//! Folder browsing and registration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use studystore_core::error::AppError;
use studystore_core::types::{DriveId, FolderId};
use studystore_entity::folder::{FolderListing, FolderPolicy, FolderRecord};
use studystore_service::{FolderDraft, StorageOrchestrator};

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List the contents of a folder on a drive
    Browse {
        /// Drive ID
        drive: DriveId,
        /// Drive-relative folder path (empty for the drive root)
        #[arg(default_value = "")]
        path: String,
    },
    /// Register an existing physical folder
    Register {
        /// Drive ID
        drive: DriveId,
        /// Drive-relative folder path
        path: String,
        /// Display name (defaults to the folder name)
        #[arg(short, long)]
        name: Option<String>,
        /// Offer the folder as a browser root
        #[arg(long)]
        browser_root: bool,
        /// Allow study folders to be created below it
        #[arg(long)]
        study_root: bool,
        /// Allow writes below it
        #[arg(long)]
        write: bool,
        /// Allow the record to be deactivated
        #[arg(long)]
        delete: bool,
    },
    /// Check whether a folder physically exists
    Exists {
        /// Drive ID
        drive: DriveId,
        /// Drive-relative folder path
        path: String,
    },
    /// Show a folder record
    Show {
        /// Folder ID
        id: FolderId,
    },
    /// Deactivate a folder record (the physical folder is kept)
    Deactivate {
        /// Folder ID
        id: FolderId,
    },
}

/// One child of a browsed folder
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Entry name
    name: String,
    /// "folder" or "file"
    kind: String,
    /// Size in bytes
    size: String,
    /// Last modification time
    modified: String,
}

fn entry_rows(listing: &FolderListing) -> Vec<EntryRow> {
    let folders = listing.folders.iter().map(|name| EntryRow {
        name: format!("{name}/"),
        kind: "folder".into(),
        size: String::new(),
        modified: String::new(),
    });
    let files = listing.files.iter().map(|file| EntryRow {
        name: file.name.clone(),
        kind: "file".into(),
        size: file.size.to_string(),
        modified: file
            .last_modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
    });
    folders.chain(files).collect()
}

/// Folder record display row
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct FolderRow {
    /// Folder ID
    id: String,
    /// Display name
    name: String,
    /// Drive-relative path
    path: String,
    /// Policy flags (b = browser root, s = study root, w = write, d = delete)
    flags: String,
    /// Active flag
    active: String,
}

impl From<&FolderRecord> for FolderRow {
    fn from(folder: &FolderRecord) -> Self {
        let p = folder.policy;
        let flags = [
            (p.browser_root, 'b'),
            (p.study_root, 's'),
            (p.write_enabled, 'w'),
            (p.delete_enabled, 'd'),
        ]
        .iter()
        .map(|(on, c)| if *on { *c } else { '-' })
        .collect();
        Self {
            id: folder.id.to_string(),
            name: folder.name.clone(),
            path: folder.path.clone(),
            flags,
            active: if folder.active { "✓" } else { "" }.to_string(),
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    orchestrator: &StorageOrchestrator,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FolderCommand::Browse { drive, path } => {
            let listing = orchestrator.browse(*drive, path).await?;
            match format {
                OutputFormat::Json => output::print_item(&listing, format),
                OutputFormat::Table => {
                    println!("/{}", listing.path);
                    output::print_list(&entry_rows(&listing), format);
                }
            }
        }
        FolderCommand::Register {
            drive,
            path,
            name,
            browser_root,
            study_root,
            write,
            delete,
        } => {
            let draft = FolderDraft {
                path: path.clone(),
                name: name.clone(),
                policy: FolderPolicy {
                    browser_root: *browser_root,
                    study_root: *study_root,
                    write_enabled: *write,
                    delete_enabled: *delete,
                },
            };
            let folder = orchestrator.register_folder(*drive, &draft).await?;
            output::print_list(&[FolderRow::from(&folder)], format);
            output::print_success(&format!("Registered folder '{}'.", folder.path));
        }
        FolderCommand::Exists { drive, path } => {
            let exists = orchestrator.folder_exists(*drive, path).await?;
            match format {
                OutputFormat::Json => output::print_item(&serde_json::json!({ "path": path, "exists": exists }), format),
                OutputFormat::Table if exists => output::print_success(&format!("'{path}' exists.")),
                OutputFormat::Table => output::print_warning(&format!("'{path}' does not exist.")),
            }
        }
        FolderCommand::Show { id } => {
            let folder = orchestrator.find_folder(*id).await?;
            output::print_item(&folder, format);
        }
        FolderCommand::Deactivate { id } => {
            orchestrator.deactivate_folder(*id).await?;
            output::print_success(&format!("Folder {id} deactivated."));
        }
    }

    Ok(())
}
