//! Business entity kinds that own storage folders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of business entity a folder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A research program.
    Program,
    /// A study within a program.
    Study,
    /// An assay within a study.
    Assay,
}

impl EntityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Study => "study",
            Self::Assay => "assay",
        }
    }

    /// The kind of the entity whose primary folder contains this kind's folders.
    pub fn parent_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Program => None,
            Self::Study => Some(Self::Program),
            Self::Assay => Some(Self::Study),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = studystore_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "program" => Ok(Self::Program),
            "study" => Ok(Self::Study),
            "assay" => Ok(Self::Assay),
            _ => Err(studystore_core::AppError::validation(format!(
                "Invalid entity kind: '{s}'. Expected one of: program, study, assay"
            ))),
        }
    }
}
