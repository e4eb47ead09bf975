//! In-process metadata store.
//!
//! Every operation holds one write lock for its whole duration, which gives
//! the same all-or-nothing behaviour as a database transaction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use validator::Validate;

use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_core::types::{DriveId, FolderId};
use studystore_entity::association::{EntityFolder, EntityRef};
use studystore_entity::drive::{Drive, NewDrive};
use studystore_entity::folder::{FolderRecord, NewFolderRecord};

use crate::store::MetadataStore;

#[derive(Debug, Default)]
struct State {
    drives: BTreeMap<DriveId, Drive>,
    folders: BTreeMap<FolderId, FolderRecord>,
    links: BTreeMap<EntityRef, Vec<(FolderId, bool)>>,
}

impl State {
    fn insert_folder(&mut self, data: &NewFolderRecord) -> AppResult<FolderRecord> {
        let taken = self
            .folders
            .values()
            .any(|f| f.drive_id == data.drive_id && f.path == data.path);
        if taken {
            return Err(AppError::conflict(format!(
                "Folder '{}' already exists on drive {}",
                data.path, data.drive_id
            )));
        }
        let now = Utc::now();
        let record = FolderRecord {
            id: FolderId::new(),
            drive_id: data.drive_id,
            name: data.name.clone(),
            path: data.path.clone(),
            policy: data.policy,
            details: data.details.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.folders.insert(record.id, record.clone());
        Ok(record)
    }

    /// Returns whether the link is primary afterwards. A non-primary link
    /// never demotes an existing primary one.
    fn link(&mut self, entity: EntityRef, folder_id: FolderId, primary: bool) -> bool {
        let links = self.links.entry(entity).or_default();
        if primary {
            for link in links.iter_mut() {
                link.1 = false;
            }
        }
        match links.iter_mut().find(|(id, _)| *id == folder_id) {
            Some(link) => {
                link.1 |= primary;
                link.1
            }
            None => {
                links.push((folder_id, primary));
                primary
            }
        }
    }
}

/// Metadata store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    state: RwLock<State>,
    writes: AtomicU64,
}

impl InMemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful write operations.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn find_drive(&self, id: DriveId) -> AppResult<Option<Drive>> {
        Ok(self.state.read().await.drives.get(&id).cloned())
    }

    async fn find_drive_by_name(&self, name: &str) -> AppResult<Option<Drive>> {
        Ok(self
            .state
            .read()
            .await
            .drives
            .values()
            .find(|d| d.display_name == name)
            .cloned())
    }

    async fn list_drives(&self, active_only: bool) -> AppResult<Vec<Drive>> {
        let state = self.state.read().await;
        let mut drives: Vec<Drive> = state
            .drives
            .values()
            .filter(|d| d.active || !active_only)
            .cloned()
            .collect();
        drives.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(drives)
    }

    async fn save_drive(&self, drive: &NewDrive) -> AppResult<Drive> {
        drive.validate()?;
        let mut state = self.state.write().await;
        if state.drives.values().any(|d| d.display_name == drive.display_name) {
            return Err(AppError::conflict(format!(
                "Drive '{}' already exists",
                drive.display_name
            )));
        }
        let now = Utc::now();
        let saved = Drive {
            id: DriveId::new(),
            drive_type: drive.drive_type,
            display_name: drive.display_name.clone(),
            root_path: drive.root_path.clone(),
            details: drive.details.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        state.drives.insert(saved.id, saved.clone());
        self.wrote();
        Ok(saved)
    }

    async fn set_drive_active(&self, id: DriveId, active: bool) -> AppResult<()> {
        let mut state = self.state.write().await;
        let drive = state
            .drives
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Drive {id} not found")))?;
        drive.active = active;
        drive.updated_at = Utc::now();
        self.wrote();
        Ok(())
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderRecord>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn find_folder_by_path(&self, drive_id: DriveId, path: &str) -> AppResult<Option<FolderRecord>> {
        Ok(self
            .state
            .read()
            .await
            .folders
            .values()
            .find(|f| f.drive_id == drive_id && f.path == path)
            .cloned())
    }

    async fn list_folders(&self, drive_id: DriveId) -> AppResult<Vec<FolderRecord>> {
        let state = self.state.read().await;
        let mut folders: Vec<FolderRecord> = state
            .folders
            .values()
            .filter(|f| f.drive_id == drive_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(folders)
    }

    async fn save_folder(&self, folder: &NewFolderRecord) -> AppResult<FolderRecord> {
        folder.validate()?;
        let saved = self.state.write().await.insert_folder(folder)?;
        self.wrote();
        Ok(saved)
    }

    async fn save_entity_folder(
        &self,
        entity: EntityRef,
        folder: &NewFolderRecord,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        folder.validate()?;
        let mut state = self.state.write().await;
        let record = state.insert_folder(folder)?;
        let is_primary = state.link(entity, record.id, primary);
        self.wrote();
        Ok(EntityFolder {
            folder: record,
            is_primary,
        })
    }

    async fn link_folder(
        &self,
        entity: EntityRef,
        folder_id: FolderId,
        primary: bool,
    ) -> AppResult<EntityFolder> {
        let mut state = self.state.write().await;
        let folder = state
            .folders
            .get(&folder_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        let is_primary = state.link(entity, folder_id, primary);
        self.wrote();
        Ok(EntityFolder { folder, is_primary })
    }

    async fn find_entity_folders(&self, entity: EntityRef) -> AppResult<Vec<EntityFolder>> {
        let state = self.state.read().await;
        let mut folders: Vec<EntityFolder> = state
            .links
            .get(&entity)
            .into_iter()
            .flatten()
            .filter_map(|(id, primary)| {
                state.folders.get(id).map(|folder| EntityFolder {
                    folder: folder.clone(),
                    is_primary: *primary,
                })
            })
            .collect();
        folders.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then_with(|| a.folder.path.cmp(&b.folder.path))
        });
        Ok(folders)
    }

    async fn find_primary_folder(&self, entity: EntityRef) -> AppResult<Option<FolderRecord>> {
        let state = self.state.read().await;
        Ok(state
            .links
            .get(&entity)
            .and_then(|links| links.iter().find(|(_, primary)| *primary))
            .and_then(|(id, _)| state.folders.get(id).cloned()))
    }

    async fn set_folder_active(&self, id: FolderId, active: bool) -> AppResult<()> {
        let mut state = self.state.write().await;
        let folder = state
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.active = active;
        folder.updated_at = Utc::now();
        self.wrote();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use studystore_core::error::ErrorKind;
    use studystore_core::types::EntityId;
    use studystore_entity::association::EntityKind;
    use studystore_entity::drive::{DriveDetails, DriveType};
    use studystore_entity::folder::{FolderDetails, FolderPolicy};

    use super::*;

    fn new_drive(name: &str) -> NewDrive {
        NewDrive {
            drive_type: DriveType::Local,
            display_name: name.into(),
            root_path: "/data".into(),
            details: DriveDetails::Filesystem {
                mount_path: "/data".into(),
            },
        }
    }

    fn new_folder(drive_id: DriveId, path: &str) -> NewFolderRecord {
        NewFolderRecord {
            drive_id,
            name: path.trim_end_matches('/').rsplit('/').next().unwrap_or(path).into(),
            path: path.into(),
            policy: FolderPolicy::writable(),
            details: FolderDetails::Filesystem,
        }
    }

    #[tokio::test]
    async fn test_drive_names_are_unique() {
        let store = InMemoryMetadataStore::new();
        store.save_drive(&new_drive("primary")).await.unwrap();
        let err = store.save_drive(&new_drive("primary")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(store.find_drive_by_name("primary").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_folder_path_unique_per_drive() {
        let store = InMemoryMetadataStore::new();
        let a = store.save_drive(&new_drive("a")).await.unwrap();
        let b = store.save_drive(&new_drive("b")).await.unwrap();

        store.save_folder(&new_folder(a.id, "programs/")).await.unwrap();
        store.save_folder(&new_folder(b.id, "programs/")).await.unwrap();
        let err = store.save_folder(&new_folder(a.id, "programs/")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(store.list_folders(a.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_new_primary_demotes_previous() {
        let store = InMemoryMetadataStore::new();
        let drive = store.save_drive(&new_drive("d")).await.unwrap();
        let entity = EntityRef::new(EntityKind::Study, EntityId::new());

        let first = store
            .save_entity_folder(entity, &new_folder(drive.id, "s/one/"), true)
            .await
            .unwrap();
        let second = store
            .save_entity_folder(entity, &new_folder(drive.id, "s/two/"), true)
            .await
            .unwrap();

        let primary = store.find_primary_folder(entity).await.unwrap().unwrap();
        assert_eq!(primary.id, second.folder.id);

        let folders = store.find_entity_folders(entity).await.unwrap();
        assert_eq!(folders.len(), 2);
        assert!(folders[0].is_primary);
        assert_eq!(folders[1].folder.id, first.folder.id);
        assert!(!folders[1].is_primary);
    }

    #[tokio::test]
    async fn test_secondary_relink_keeps_primary() {
        let store = InMemoryMetadataStore::new();
        let drive = store.save_drive(&new_drive("d")).await.unwrap();
        let entity = EntityRef::new(EntityKind::Program, EntityId::new());
        let saved = store
            .save_entity_folder(entity, &new_folder(drive.id, "p/"), true)
            .await
            .unwrap();

        let relinked = store.link_folder(entity, saved.folder.id, false).await.unwrap();
        assert!(relinked.is_primary);
        let primary = store.find_primary_folder(entity).await.unwrap().unwrap();
        assert_eq!(primary.id, saved.folder.id);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_link() {
        let store = InMemoryMetadataStore::new();
        let drive = store.save_drive(&new_drive("d")).await.unwrap();
        store.save_folder(&new_folder(drive.id, "taken/")).await.unwrap();
        let entity = EntityRef::new(EntityKind::Program, EntityId::new());

        let err = store
            .save_entity_folder(entity, &new_folder(drive.id, "taken/"), true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(store.find_entity_folders(entity).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_link_missing_folder() {
        let store = InMemoryMetadataStore::new();
        let entity = EntityRef::new(EntityKind::Assay, EntityId::new());
        let err = store.link_folder(entity, FolderId::new(), false).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
