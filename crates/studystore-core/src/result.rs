//! Convenience result type alias for StudyStore.

use crate::error::AppError;

/// A specialized `Result` type for StudyStore operations.
pub type AppResult<T> = Result<T, AppError>;
