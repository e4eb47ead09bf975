//! Entity-folder association model.

use serde::{Deserialize, Serialize};
use std::fmt;

use studystore_core::types::EntityId;

use super::kind::EntityKind;
use crate::folder::FolderRecord;

/// A reference to a business entity owned by the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity identifier.
    pub id: EntityId,
}

impl EntityRef {
    /// Create a new entity reference.
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A folder record in an entity's folder set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityFolder {
    /// The linked folder record.
    pub folder: FolderRecord,
    /// Whether this is the entity's canonical folder.
    pub is_primary: bool,
}
