//! Error types for store operations.

use sonargate_core::EntityKind;
use thiserror::Error;

/// Errors that can occur while reading or writing entity records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the given name.
    #[error("entity not found: {name}")]
    NotFound { name: String },

    /// A record exists under the name but belongs to a different kind.
    #[error("entity {name} is a {found}, not a {expected}")]
    TypeMismatch {
        name: String,
        expected: EntityKind,
        found: EntityKind,
    },

    /// A record of another kind already occupies the name.
    #[error("entity already exists under another kind: {name}")]
    AlreadyExists { name: String },

    /// A condition's resolved gate reference may not be changed.
    #[error("gate reference of condition {name} is immutable once resolved")]
    ImmutableReference { name: String },

    /// Snapshot file I/O failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record or snapshot could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
