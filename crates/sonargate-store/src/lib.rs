//! # sonargate-store
//!
//! Persistence and annotation store for the controller's entities. It holds
//! the user-writable desired specification, the reconciler-writable
//! external-identity annotation, the last observed state, and a readiness
//! condition per entity.
//!
//! The [`EntityStore`] trait is the seam; [`MemoryStore`] is the in-memory
//! backend, with JSON snapshots so external identities survive controller
//! restarts. Records are stored as kind-tagged documents: asking for a
//! record under the wrong kind is a type mismatch, not a silent miss.

mod error;
mod memory;
mod records;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use records::{ConditionRecord, GateRecord, ManagedRecord, StoredEntity};
pub use traits::{DynEntityStore, EntityStore};

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;
