//! Drive management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use studystore_core::config::AppConfig;
use studystore_core::error::AppError;
use studystore_core::types::DriveId;
use studystore_database::{MetadataStore, PgMetadataStore};
use studystore_entity::drive::{Drive, DriveDetails};

use crate::output::{self, OutputFormat};

/// Arguments for drive commands
#[derive(Debug, Args)]
pub struct DriveArgs {
    /// Drive subcommand
    #[command(subcommand)]
    pub command: DriveCommand,
}

/// Drive subcommands
#[derive(Debug, Subcommand)]
pub enum DriveCommand {
    /// List registered drives
    List {
        /// Include inactive drives
        #[arg(long)]
        all: bool,
    },
    /// Register drives declared in configuration that are not yet registered
    Sync,
    /// Allow new folders on a drive
    Enable {
        /// Drive ID
        id: DriveId,
    },
    /// Stop new folders from being created on a drive
    Disable {
        /// Drive ID
        id: DriveId,
    },
}

/// Drive display row
#[derive(Debug, Serialize, Tabled)]
struct DriveRow {
    /// Drive ID
    id: String,
    /// Display name
    name: String,
    /// Drive type
    #[tabled(rename = "type")]
    drive_type: String,
    /// Bucket or mount path
    location: String,
    /// Active flag
    active: String,
}

impl From<&Drive> for DriveRow {
    fn from(drive: &Drive) -> Self {
        let location = match &drive.details {
            DriveDetails::ObjectStorage { bucket, integration } => format!("s3://{bucket} ({integration})"),
            DriveDetails::Filesystem { mount_path } => mount_path.clone(),
        };
        Self {
            id: drive.id.to_string(),
            name: drive.display_name.clone(),
            drive_type: drive.drive_type.to_string(),
            location,
            active: if drive.active { "✓" } else { "" }.to_string(),
        }
    }
}

/// Execute drive commands
pub async fn execute(
    args: &DriveArgs,
    config: &AppConfig,
    store: &PgMetadataStore,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        DriveCommand::List { all } => {
            let drives = store.list_drives(!all).await?;
            let rows: Vec<DriveRow> = drives.iter().map(DriveRow::from).collect();
            output::print_list(&rows, format);
        }
        DriveCommand::Sync => {
            let created = studystore_service::seed_drives(&config.storage, store).await?;
            if created.is_empty() {
                output::print_success("All configured drives are already registered.");
            } else {
                let rows: Vec<DriveRow> = created.iter().map(DriveRow::from).collect();
                output::print_list(&rows, format);
                output::print_success(&format!("Registered {} drive(s).", created.len()));
            }
        }
        DriveCommand::Enable { id } => {
            store.set_drive_active(*id, true).await?;
            output::print_success(&format!("Drive {id} enabled."));
        }
        DriveCommand::Disable { id } => {
            store.set_drive_active(*id, false).await?;
            output::print_success(&format!("Drive {id} disabled."));
        }
    }

    Ok(())
}
