//! The store seam consumed by the reconcilers and the controller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::records::{ConditionRecord, GateRecord};

/// Store of tracked entities, keyed by record name across both kinds.
///
/// Implementations must be thread-safe. The reconcilers only ever read
/// through this trait (the reference resolver's parent lookup); writes are
/// the scheduler's job after a cycle completes.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetches a gate record by name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when no record exists, and
    /// `StoreError::TypeMismatch` when the name belongs to a condition.
    async fn gate(&self, name: &str) -> Result<GateRecord, StoreError>;

    /// Fetches a condition record by name.
    async fn condition(&self, name: &str) -> Result<ConditionRecord, StoreError>;

    /// Lists all gate records in name order.
    async fn list_gates(&self) -> Result<Vec<GateRecord>, StoreError>;

    /// Lists all condition records in name order.
    async fn list_conditions(&self) -> Result<Vec<ConditionRecord>, StoreError>;

    /// Inserts or replaces a gate record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` when the name is occupied by a
    /// record of another kind.
    async fn put_gate(&self, record: GateRecord) -> Result<(), StoreError>;

    /// Inserts or replaces a condition record.
    ///
    /// # Errors
    ///
    /// In addition to the kind-collision check, returns
    /// `StoreError::ImmutableReference` when the record would change an
    /// already-resolved gate reference.
    async fn put_condition(&self, record: ConditionRecord) -> Result<(), StoreError>;

    /// Removes a record of either kind; removing an absent name succeeds.
    async fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// Type alias for a shared entity store.
pub type DynEntityStore = Arc<dyn EntityStore>;
