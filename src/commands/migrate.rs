//! Metadata store migration command.

use studystore_core::error::AppError;
use studystore_database::PgMetadataStore;

use crate::output::{self, OutputFormat};

/// Apply pending migrations, then report what the store holds.
pub async fn execute(store: &PgMetadataStore, format: OutputFormat) -> Result<(), AppError> {
    println!("Running metadata store migrations...");
    store.migrate().await?;
    let inventory = store.inventory().await?;
    output::print_success("All migrations applied.");
    output::print_item(&inventory, format);
    Ok(())
}
