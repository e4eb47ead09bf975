//! # studystore-core
//!
//! Core crate for StudyStore. Contains the unified error system,
//! configuration schemas, typed identifiers, and the path conventions
//! shared by every storage adapter.
//!
//! This crate has **no** internal dependencies on other StudyStore crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
