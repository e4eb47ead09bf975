//! # studystore-database
//!
//! Metadata persistence for StudyStore. The [`MetadataStore`] trait is the
//! seam used by the orchestrator; [`PgMetadataStore`] backs it with
//! PostgreSQL repositories and [`InMemoryMetadataStore`] keeps everything in
//! process for tests and offline runs.

pub mod memory;
pub mod migration;
pub mod pg;
pub mod repositories;
pub mod store;

pub use memory::InMemoryMetadataStore;
pub use pg::{PgMetadataStore, StoreInventory};
pub use store::MetadataStore;
