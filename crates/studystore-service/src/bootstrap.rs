//! Registration of configured drives.

use tracing::{debug, info};
use validator::Validate;

use studystore_core::config::{DriveConfig, StorageConfig};
use studystore_core::error::AppError;
use studystore_core::result::AppResult;
use studystore_database::MetadataStore;
use studystore_entity::drive::{Drive, DriveDetails, DriveType, NewDrive};

/// Create every configured drive that is not registered yet, matching by
/// display name. Returns the drives created by this call.
pub async fn seed_drives(config: &StorageConfig, store: &dyn MetadataStore) -> AppResult<Vec<Drive>> {
    let mut created = Vec::new();
    for entry in &config.drives {
        entry.validate()?;
        if store.find_drive_by_name(&entry.name).await?.is_some() {
            debug!(name = %entry.name, "Drive already registered");
            continue;
        }
        let drive = store.save_drive(&new_drive(entry)?).await?;
        info!(drive_id = %drive.id, name = %drive.display_name, drive_type = %drive.drive_type, "Seeded drive");
        created.push(drive);
    }
    Ok(created)
}

fn new_drive(entry: &DriveConfig) -> AppResult<NewDrive> {
    let drive_type: DriveType = entry.drive_type.parse()?;
    let missing = |field: &str| {
        AppError::configuration(format!(
            "Drive '{}' of type {drive_type} needs '{field}'",
            entry.name
        ))
    };

    let details = match drive_type {
        DriveType::ObjectStorage => DriveDetails::ObjectStorage {
            bucket: entry.bucket.clone().ok_or_else(|| missing("bucket"))?,
            integration: entry.integration.clone().ok_or_else(|| missing("integration"))?,
        },
        DriveType::Local | DriveType::NetworkShare => DriveDetails::Filesystem {
            mount_path: entry
                .mount_path
                .clone()
                .or_else(|| (!entry.root_path.is_empty()).then(|| entry.root_path.clone()))
                .ok_or_else(|| missing("mount_path"))?,
        },
    };

    let root_path = match (&details, entry.root_path.is_empty()) {
        (DriveDetails::Filesystem { mount_path }, true) => mount_path.clone(),
        _ => entry.root_path.clone(),
    };

    Ok(NewDrive {
        drive_type,
        display_name: entry.name.clone(),
        root_path,
        details,
    })
}
