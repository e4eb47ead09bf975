//! Entity folder commands: create, attach, list and repair.

use clap::{Args, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use tabled::Tabled;

use studystore_core::error::{AppError, ErrorKind};
use studystore_core::types::{EntityId, FolderId};
use studystore_entity::association::{EntityFolder, EntityKind, EntityRef};
use studystore_service::{CreateFolderOptions, RepairOutcome, StorageEntity, StorageOrchestrator};

use crate::output::{self, OutputFormat};

/// Arguments for entity commands
#[derive(Debug, Args)]
pub struct EntityArgs {
    /// Entity subcommand
    #[command(subcommand)]
    pub command: EntityCommand,
}

/// Identifies an entity by kind and ID
#[derive(Debug, Args)]
pub struct EntityKey {
    /// Entity kind (program, study, assay)
    pub kind: EntityKind,
    /// Entity ID
    pub id: EntityId,
}

impl EntityKey {
    fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind, self.id)
    }
}

/// The entity fields folder naming and repair need
#[derive(Debug, Args)]
pub struct EntityTarget {
    #[command(flatten)]
    pub key: EntityKey,
    /// Business code used for the folder name
    #[arg(long)]
    pub code: String,
    /// Human-readable name (defaults to the code)
    #[arg(long)]
    pub name: Option<String>,
    /// ID of the parent entity (a study's program, an assay's study)
    #[arg(long)]
    pub parent: Option<EntityId>,
}

impl EntityTarget {
    fn to_entity(&self) -> Result<StorageEntity, AppError> {
        let name = self.name.clone().unwrap_or_else(|| self.code.clone());
        let entity = StorageEntity::new(self.key.kind, self.key.id, &self.code, name);
        match (self.parent, self.key.kind.parent_kind()) {
            (None, _) => Ok(entity),
            (Some(id), Some(kind)) => Ok(entity.with_parent(EntityRef::new(kind, id))),
            (Some(_), None) => Err(AppError::validation(format!(
                "A {} has no parent entity",
                self.key.kind
            ))),
        }
    }
}

/// Entity subcommands
#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    /// Create an entity's folder below a registered folder
    CreateFolder {
        #[command(flatten)]
        target: EntityTarget,
        /// Parent folder ID
        #[arg(long)]
        under: FolderId,
        /// Make the new folder the entity's primary folder
        #[arg(long)]
        primary: bool,
        /// Display name for the folder record
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Link an existing folder record to an entity
    Attach {
        #[command(flatten)]
        key: EntityKey,
        /// Folder ID
        folder: FolderId,
        /// Make it the entity's primary folder
        #[arg(long)]
        primary: bool,
    },
    /// List the folders linked to an entity
    Folders {
        #[command(flatten)]
        key: EntityKey,
    },
    /// Verify an entity's primary folder and recreate it if missing
    Repair {
        #[command(flatten)]
        target: EntityTarget,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Linked folder display row
#[derive(Debug, Serialize, Tabled)]
struct LinkRow {
    /// Folder ID
    id: String,
    /// Display name
    name: String,
    /// Drive-relative path
    path: String,
    /// Primary flag
    primary: String,
    /// Active flag
    active: String,
}

impl From<&EntityFolder> for LinkRow {
    fn from(link: &EntityFolder) -> Self {
        Self {
            id: link.folder.id.to_string(),
            name: link.folder.name.clone(),
            path: link.folder.path.clone(),
            primary: if link.is_primary { "✓" } else { "" }.to_string(),
            active: if link.folder.active { "✓" } else { "" }.to_string(),
        }
    }
}

/// Execute entity commands
pub async fn execute(
    args: &EntityArgs,
    orchestrator: &StorageOrchestrator,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        EntityCommand::CreateFolder {
            target,
            under,
            primary,
            display_name,
        } => {
            let entity = target.to_entity()?;
            let parent = orchestrator.find_folder(*under).await?;
            let options = CreateFolderOptions {
                primary: *primary,
                display_name: display_name.clone(),
            };
            let folder = orchestrator.create_folder_for(&entity, &parent, &options).await?;
            output::print_item(&folder, format);
            output::print_success(&format!("Folder '{}' linked to {}.", folder.path, entity.reference()));
        }
        EntityCommand::Attach { key, folder, primary } => {
            let linked = orchestrator.attach_folder(key.reference(), *folder, *primary).await?;
            output::print_list(&[LinkRow::from(&linked)], format);
        }
        EntityCommand::Folders { key } => {
            let links = orchestrator.list_entity_folders(key.reference()).await?;
            match format {
                OutputFormat::Json => output::print_item(&links, format),
                OutputFormat::Table => {
                    let rows: Vec<LinkRow> = links.iter().map(LinkRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        EntityCommand::Repair { target, yes } => {
            let entity = target.to_entity()?;
            if !yes {
                let proceed = Confirm::new()
                    .with_prompt(format!("Repair the primary folder of {}?", entity.reference()))
                    .default(true)
                    .interact()
                    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Prompt failed", e))?;
                if !proceed {
                    output::print_warning("Repair cancelled.");
                    return Ok(());
                }
            }

            let outcome = orchestrator.repair(&entity).await?;
            output::print_item(&outcome, format);
            match &outcome {
                RepairOutcome::Verified(folder) => {
                    output::print_success(&format!("'{}' is intact.", folder.path))
                }
                RepairOutcome::Recreated(folder) => {
                    output::print_warning(&format!("'{}' was missing and has been recreated.", folder.path))
                }
                RepairOutcome::Created(folder) => {
                    output::print_warning(&format!("No primary folder existed; created '{}'.", folder.path))
                }
                RepairOutcome::Deactivated(folder) => output::print_warning(&format!(
                    "Primary folder record '{}' is deactivated; nothing was checked.",
                    folder.path
                )),
            }
        }
    }

    Ok(())
}
