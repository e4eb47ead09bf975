//! File upload and download commands.

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Args, Subcommand};

use studystore_core::error::AppError;
use studystore_core::types::{DriveId, FolderId};
use studystore_service::StorageOrchestrator;

use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Download a file below a folder record
    Get {
        /// Folder ID
        folder: FolderId,
        /// Drive-relative file path
        path: String,
        /// Write to this local file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a local file into a folder record
    Put {
        /// Folder ID
        folder: FolderId,
        /// Local file to upload
        source: PathBuf,
        /// Target directory below the folder (defaults to the folder itself)
        #[arg(short, long, default_value = "")]
        path: String,
        /// Target file name (defaults to the local file name)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show a file's metadata
    Info {
        /// Drive ID
        drive: DriveId,
        /// Drive-relative file path
        path: String,
    },
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    orchestrator: &StorageOrchestrator,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FileCommand::Get {
            folder,
            path,
            output: target,
        } => {
            let content = orchestrator.fetch_file(*folder, path).await?;
            match target {
                Some(target) => {
                    tokio::fs::write(target, &content).await?;
                    output::print_success(&format!(
                        "Wrote {} bytes to {}",
                        content.len(),
                        target.display()
                    ));
                }
                None => {
                    use tokio::io::AsyncWriteExt;
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&content).await?;
                    stdout.flush().await?;
                }
            }
        }
        FileCommand::Put {
            folder,
            source,
            path,
            name,
        } => {
            let name = match name {
                Some(name) => name.clone(),
                None => source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        AppError::validation(format!("'{}' has no file name", source.display()))
                    })?,
            };
            let content = Bytes::from(tokio::fs::read(source).await?);
            let saved = orchestrator.save_file(*folder, path, &name, content).await?;
            output::print_item(&saved, format);
        }
        FileCommand::Info { drive, path } => {
            let file = orchestrator.find_file(*drive, path).await?;
            output::print_item(&file, format);
        }
    }

    Ok(())
}
