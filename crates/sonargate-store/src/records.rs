//! Entity records: desired specification plus the reconciler-owned state.

use serde::{Deserialize, Serialize};
use sonargate_core::{
    ConditionObservation, ConditionSpec, EntityKind, EntityMeta, GateObservation, GateSpec,
    Readiness,
};

use crate::error::StoreError;

/// A tracked quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRecord {
    pub meta: EntityMeta,

    /// Desired state; user-writable.
    pub spec: GateSpec,

    /// Name of the remote quality gate; `None` until created. Written only
    /// by the reconciler, on creation and rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,

    /// Last observed remote state; refreshed on every successful lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GateObservation>,

    /// Readiness of the remote counterpart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<Readiness>,
}

impl GateRecord {
    pub fn new(meta: EntityMeta, spec: GateSpec) -> Self {
        Self {
            meta,
            spec,
            external_name: None,
            status: None,
            readiness: None,
        }
    }
}

/// A tracked quality gate condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub meta: EntityMeta,

    /// Desired state; user-writable, except that a resolved gate reference
    /// is immutable.
    pub spec: ConditionSpec,

    /// Remote-assigned condition id; `None` until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,

    /// Last observed remote state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConditionObservation>,

    /// Readiness of the remote counterpart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<Readiness>,
}

impl ConditionRecord {
    pub fn new(meta: EntityMeta, spec: ConditionSpec) -> Self {
        Self {
            meta,
            spec,
            external_name: None,
            status: None,
            readiness: None,
        }
    }
}

/// Access to the fields every record kind shares, used by the generic
/// reconcile driver.
pub trait ManagedRecord {
    fn meta(&self) -> &EntityMeta;
    fn external_name(&self) -> Option<&str>;
}

impl ManagedRecord for GateRecord {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn external_name(&self) -> Option<&str> {
        self.external_name.as_deref()
    }
}

impl ManagedRecord for ConditionRecord {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn external_name(&self) -> Option<&str> {
        self.external_name.as_deref()
    }
}

/// Kind-tagged persisted form of a record; also the snapshot file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntity {
    pub kind: EntityKind,
    pub document: serde_json::Value,
}

impl StoredEntity {
    pub fn from_gate(record: &GateRecord) -> Result<Self, StoreError> {
        Ok(Self {
            kind: EntityKind::QualityGate,
            document: serde_json::to_value(record)?,
        })
    }

    pub fn from_condition(record: &ConditionRecord) -> Result<Self, StoreError> {
        Ok(Self {
            kind: EntityKind::QualityGateCondition,
            document: serde_json::to_value(record)?,
        })
    }

    /// Decodes the document as a gate record, failing with a type mismatch
    /// when the stored kind differs.
    pub fn into_gate(self, name: &str) -> Result<GateRecord, StoreError> {
        if self.kind != EntityKind::QualityGate {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: EntityKind::QualityGate,
                found: self.kind,
            });
        }
        Ok(serde_json::from_value(self.document)?)
    }

    /// Decodes the document as a condition record, failing with a type
    /// mismatch when the stored kind differs.
    pub fn into_condition(self, name: &str) -> Result<ConditionRecord, StoreError> {
        if self.kind != EntityKind::QualityGateCondition {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: EntityKind::QualityGateCondition,
                found: self.kind,
            });
        }
        Ok(serde_json::from_value(self.document)?)
    }
}
