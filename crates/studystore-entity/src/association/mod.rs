//! Links between business entities and their storage folders.

pub mod kind;
pub mod model;

pub use kind::EntityKind;
pub use model::{EntityFolder, EntityRef};
