//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::{DriveConfig, FolderFailurePolicy, IntegrationConfig, StorageConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata store connection settings.
    pub database: DatabaseConfig,
    /// Drives, integrations and storage policy.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `path` with an optional `config/{env}` overlay and environment
    /// variables prefixed with `STUDYSTORE__` (e.g.
    /// `STUDYSTORE__DATABASE__URL`).
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("STUDYSTORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
