//! Folder naming for business entities.

use studystore_core::types::EntityId;
use studystore_entity::association::{EntityKind, EntityRef};

/// The view of a business entity needed to create and repair its folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntity {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity identifier.
    pub id: EntityId,
    /// Short business code, e.g. `"001"` or `"PRG-7"`.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// The entity whose primary folder contains this entity's folder.
    pub parent: Option<EntityRef>,
}

impl StorageEntity {
    /// Create an entity view with no parent.
    pub fn new(kind: EntityKind, id: EntityId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            code: code.into(),
            name: name.into(),
            parent: None,
        }
    }

    /// Set the parent entity.
    pub fn with_parent(mut self, parent: EntityRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Reference used for folder links.
    pub fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind, self.id)
    }
}

/// Chooses the folder name for an entity.
///
/// Any `Fn(&StorageEntity) -> String` is a namer.
pub trait FolderNamer: Send + Sync + 'static {
    /// The folder name for `entity`. Must not contain `/`.
    fn folder_name(&self, entity: &StorageEntity) -> String;
}

impl<F> FolderNamer for F
where
    F: Fn(&StorageEntity) -> String + Send + Sync + 'static,
{
    fn folder_name(&self, entity: &StorageEntity) -> String {
        self(entity)
    }
}

/// Default namer: `"{kind}-{slug(code)}"`, e.g. `study-001`.
///
/// Falls back to the entity name and then the ID when the code has no
/// usable characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugNamer;

impl FolderNamer for SlugNamer {
    fn folder_name(&self, entity: &StorageEntity) -> String {
        let base = [slug(&entity.code), slug(&entity.name)]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| entity.id.to_string());
        format!("{}-{base}", entity.kind)
    }
}

/// Lowercase ASCII alphanumerics, with every other run of characters
/// collapsed to a single `-`.
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
