//! PostgreSQL repositories for drives, folder records and entity links.

pub mod association;
pub mod drive;
pub mod folder;

pub use association::EntityFolderRepository;
pub use drive::DriveRepository;
pub use folder::FolderRepository;

use studystore_core::error::{AppError, ErrorKind};

/// Translate a sqlx error, reporting unique-constraint violations as
/// `Conflict`.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        AppError::conflict(format!("{context}: record already exists"))
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}
