//! In-memory store backend with JSON snapshots.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use sonargate_core::EntityKind;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::records::{ConditionRecord, GateRecord, StoredEntity};
use crate::traits::EntityStore;

/// In-memory entity store.
///
/// A `BTreeMap` keeps listing order deterministic, which in turn keeps the
/// scheduler's sweep order stable. The whole map sits behind a single
/// `RwLock`; the store tracks a handful of entities, not a workload.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RwLock<BTreeMap<String, StoredEntity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a snapshot file written by [`Self::save_snapshot`].
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let entities: BTreeMap<String, StoredEntity> = serde_json::from_str(&raw)?;
        tracing::debug!(count = entities.len(), path = %path.display(), "state snapshot loaded");
        Ok(Self {
            entities: RwLock::new(entities),
        })
    }

    /// Writes the current state to a snapshot file.
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let entities = self.entities.read().await;
        let raw = serde_json::to_string_pretty(&*entities)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Number of records of both kinds.
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn gate(&self, name: &str) -> Result<GateRecord, StoreError> {
        let entities = self.entities.read().await;
        let stored = entities
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(name))?;
        stored.into_gate(name)
    }

    async fn condition(&self, name: &str) -> Result<ConditionRecord, StoreError> {
        let entities = self.entities.read().await;
        let stored = entities
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(name))?;
        stored.into_condition(name)
    }

    async fn list_gates(&self) -> Result<Vec<GateRecord>, StoreError> {
        let entities = self.entities.read().await;
        entities
            .iter()
            .filter(|(_, stored)| stored.kind == EntityKind::QualityGate)
            .map(|(name, stored)| stored.clone().into_gate(name))
            .collect()
    }

    async fn list_conditions(&self) -> Result<Vec<ConditionRecord>, StoreError> {
        let entities = self.entities.read().await;
        entities
            .iter()
            .filter(|(_, stored)| stored.kind == EntityKind::QualityGateCondition)
            .map(|(name, stored)| stored.clone().into_condition(name))
            .collect()
    }

    async fn put_gate(&self, record: GateRecord) -> Result<(), StoreError> {
        let mut entities = self.entities.write().await;
        let name = record.meta.name.clone();
        if let Some(existing) = entities.get(&name)
            && existing.kind != EntityKind::QualityGate
        {
            return Err(StoreError::AlreadyExists { name });
        }
        entities.insert(name, StoredEntity::from_gate(&record)?);
        Ok(())
    }

    async fn put_condition(&self, record: ConditionRecord) -> Result<(), StoreError> {
        let mut entities = self.entities.write().await;
        let name = record.meta.name.clone();
        if let Some(existing) = entities.get(&name) {
            if existing.kind != EntityKind::QualityGateCondition {
                return Err(StoreError::AlreadyExists { name });
            }
            let current = existing.clone().into_condition(&name)?;
            if let (Some(current_gate), Some(new_gate)) =
                (&current.spec.gate_name, &record.spec.gate_name)
                && current_gate != new_gate
            {
                return Err(StoreError::ImmutableReference { name });
            }
        }
        entities.insert(name, StoredEntity::from_condition(&record)?);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.entities.write().await.remove(name);
        Ok(())
    }
}
