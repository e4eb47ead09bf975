//! Storage drive entities.

pub mod details;
pub mod drive_type;
pub mod model;

pub use details::DriveDetails;
pub use drive_type::DriveType;
pub use model::{Drive, NewDrive};
