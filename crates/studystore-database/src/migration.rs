//! Schema migrations for the metadata store.

use sqlx::PgPool;
use tracing::info;

use studystore_core::error::{AppError, ErrorKind};

/// Apply every pending migration from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(available = migrator.iter().count(), "Applying metadata store migrations");

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to apply migrations", e)
    })?;

    info!("Metadata store schema is up to date");
    Ok(())
}
