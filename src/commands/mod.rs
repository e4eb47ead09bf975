//! CLI command definitions and dispatch.

pub mod drive;
pub mod entity;
pub mod file;
pub mod folder;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use studystore_core::config::AppConfig;
use studystore_core::error::AppError;
use studystore_database::PgMetadataStore;
use studystore_service::StorageOrchestrator;
use studystore_storage::AdapterRegistry;

use crate::output::OutputFormat;

/// StudyStore: storage drives, study folders and repair
#[derive(Debug, Parser)]
#[command(name = "studystore", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(short, long, env = "STUDYSTORE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending metadata store migrations
    Migrate,
    /// Drive management
    Drive(drive::DriveArgs),
    /// Folder browsing and registration
    Folder(folder::FolderArgs),
    /// File upload and download
    File(file::FileArgs),
    /// Entity folders and repair
    Entity(entity::EntityArgs),
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let store = PgMetadataStore::connect(&config.database).await?;
        let result = match &self.command {
            Commands::Migrate => migrate::execute(&store, self.format).await,
            Commands::Drive(args) => drive::execute(args, config, &store, self.format).await,
            Commands::Folder(args) => {
                let orchestrator = build_orchestrator(config, &store).await?;
                folder::execute(args, &orchestrator, self.format).await
            }
            Commands::File(args) => {
                let orchestrator = build_orchestrator(config, &store).await?;
                file::execute(args, &orchestrator, self.format).await
            }
            Commands::Entity(args) => {
                let orchestrator = build_orchestrator(config, &store).await?;
                entity::execute(args, &orchestrator, self.format).await
            }
        };
        store.close().await;
        result
    }
}

/// Wire the metadata store, adapter registry and orchestrator.
pub async fn build_orchestrator(config: &AppConfig, store: &PgMetadataStore) -> Result<StorageOrchestrator, AppError> {
    let store = Arc::new(store.clone());
    let registry = AdapterRegistry::from_config(&config.storage).await?;
    Ok(StorageOrchestrator::new(store, Arc::new(registry))
        .with_failure_policy(config.storage.folder_failure_policy))
}
