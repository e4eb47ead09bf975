//! Folder records and transient folder/file listings.

pub mod listing;
pub mod model;

pub use listing::{FileDescriptor, FolderListing};
pub use model::{FolderDetails, FolderPolicy, FolderRecord, NewFolderRecord};
