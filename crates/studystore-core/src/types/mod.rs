//! Core type definitions used across the StudyStore workspace.

pub mod id;
pub mod path;

pub use id::*;
