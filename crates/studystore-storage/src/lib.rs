//! # studystore-storage
//!
//! Storage adapters for StudyStore. An adapter translates the generic
//! folder/file contract of [`StorageAdapter`] into backend calls for one
//! family of drives:
//!
//! - [`ObjectStorageAdapter`]: S3-compatible buckets, where a folder is a
//!   zero-length marker object whose key ends with `/`.
//! - [`FilesystemAdapter`]: local directories and mounted network shares.
//!
//! The [`AdapterRegistry`] maps each drive type to its adapter and is built
//! once at start-up.

pub mod adapter;
pub mod filesystem;
pub mod object;
pub mod registry;
pub mod resolver;

pub use adapter::StorageAdapter;
pub use filesystem::FilesystemAdapter;
pub use object::{InMemoryObjectStore, ObjectStorageAdapter, ObjectStoreClient, ObjectStoreError};
pub use registry::{AdapterRegistry, AdapterRegistryBuilder};
pub use resolver::{ClientResolver, IntegrationRegistry};
