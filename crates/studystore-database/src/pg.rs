//! PostgreSQL-backed metadata store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, info};
use validator::Validate;

use studystore_core::config::DatabaseConfig;
use studystore_core::error::{AppError, ErrorKind};
use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId};
use studystore_entity::association::{EntityFolder, EntityRef};
use studystore_entity::drive::{Drive, NewDrive};
use studystore_entity::folder::{FolderRecord, NewFolderRecord};

use crate::migration;
use crate::repositories::{DriveRepository, EntityFolderRepository, FolderRepository};
use crate::store::MetadataStore;

/// Row counts of the metadata tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoreInventory {
    /// Registered drives, active or not.
    pub drives: i64,
    /// Folder records across all drives.
    pub folders: i64,
    /// Entity-folder links.
    pub links: i64,
}

/// Metadata store over the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
    drives: DriveRepository,
    folders: FolderRepository,
    links: EntityFolderRepository,
}

impl PgMetadataStore {
    /// Create a store sharing `pool` across its repositories.
    pub fn new(pool: PgPool) -> Self {
        Self {
            drives: DriveRepository::new(pool.clone()),
            folders: FolderRepository::new(pool.clone()),
            links: EntityFolderRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool from the `[database]` section and build the store on it.
    ///
    /// Credentials never reach the log: only host, port and database name
    /// are recorded.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(&config.url)?;
        let target = describe_target(&options);
        info!(
            %target,
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to metadata database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to metadata database at {target}"),
                    e,
                )
            })?;
        Ok(Self::new(pool))
    }

    /// Bring the schema up to date.
    pub async fn migrate(&self) -> AppResult<()> {
        migration::run_migrations(&self.pool).await
    }

    /// Count drives, folder records and entity links. Fails if the schema is
    /// missing.
    pub async fn inventory(&self) -> AppResult<StoreInventory> {
        sqlx::query_as::<_, StoreInventory>(
            "SELECT (SELECT COUNT(*) FROM storage_drives) AS drives, \
                    (SELECT COUNT(*) FROM storage_folders) AS folders, \
                    (SELECT COUNT(*) FROM entity_storage_folders) AS links",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read store inventory", e))
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Metadata database pool closed");
    }
}

fn connect_options(url: &str) -> AppResult<PgConnectOptions> {
    PgConnectOptions::from_str(url).map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, "Invalid database.url", e)
    })
}

fn describe_target(options: &PgConnectOptions) -> String {
    format!(
        "{}:{}/{}",
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or_default()
    )
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn find_drive(&self, id: DriveId) -> AppResult<Option<Drive>> {
        self.drives.find_by_id(id).await
    }

    async fn find_drive_by_name(&self, name: &str) -> AppResult<Option<Drive>> {
        self.drives.find_by_name(name).await
    }

    async fn list_drives(&self, active_only: bool) -> AppResult<Vec<Drive>> {
        self.drives.find_all(active_only).await
    }

    async fn save_drive(&self, drive: &NewDrive) -> AppResult<Drive> {
        drive.validate()?;
        let saved = self.drives.create(drive).await?;
        info!(drive_id = %saved.id, name = %saved.display_name, drive_type = %saved.drive_type, "Registered drive");
        Ok(saved)
    }

    async fn set_drive_active(&self, id: DriveId, active: bool) -> AppResult<()> {
        self.drives.set_active(id, active).await
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderRecord>> {
        self.folders.find_by_id(id).await
    }

    async fn find_folder_by_path(&self, drive_id: DriveId, path: &str) -> AppResult<Option<FolderRecord>> {
        self.folders.find_by_path(drive_id, path).await
    }

    async fn list_folders(&self, drive_id: DriveId) -> AppResult<Vec<FolderRecord>> {
        self.folders.find_by_drive(drive_id).await
    }

    async fn save_folder(&self, folder: &NewFolderRecord) -> AppResult<FolderRecord> {
        folder.validate()?;
        let saved = self.folders.create(folder).await?;
        debug!(folder_id = %saved.id, path = %saved.path, "Saved folder record");
        Ok(saved)
    }

    async fn save_entity_folder(
        &self,
        entity: EntityRef,
        folder: &NewFolderRecord,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        folder.validate()?;
        let saved = self.links.create_linked(entity, folder, primary).await?;
        debug!(%entity, folder_id = %saved.folder.id, primary, "Saved entity folder");
        Ok(saved)
    }

    async fn link_folder(
        &self,
        entity: EntityRef,
        folder_id: FolderId,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        let is_primary = self.links.link(entity, folder_id, primary).await?;
        Ok(EntityFolder { folder, is_primary })
    }

    async fn find_entity_folders(&self, entity: EntityRef) -> AppResult<Vec<EntityFolder>> {
        self.links.find_by_entity(entity).await
    }

    async fn find_primary_folder(&self, entity: EntityRef) -> AppResult<Option<FolderRecord>> {
        self.links.find_primary(entity).await
    }

    async fn set_folder_active(&self, id: FolderId, active: bool) -> AppResult<()> {
        self.folders.set_active(id, active).await
    }
}
