//! Entity metadata shared by both tracked kinds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The kinds of entities the controller tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    QualityGate,
    QualityGateCondition,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QualityGate => f.write_str("QualityGate"),
            Self::QualityGateCondition => f.write_str("QualityGateCondition"),
        }
    }
}

/// Metadata of a locally-tracked entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Record name; the key under which the entity is stored locally.
    pub name: String,

    /// Labels used by selector-based references.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Set when the entity has been removed from the desired manifest; the
    /// next reconcile cycle deletes the remote counterpart.
    #[serde(default)]
    pub deletion_requested: bool,
}

impl EntityMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Readiness of the remote counterpart as seen by the last cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    Creating,
    Available,
    Deleting,
}

/// Readiness condition with the time of the last transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub state: ReadinessState,
    #[serde(with = "time::serde::rfc3339")]
    pub since: OffsetDateTime,
}

impl Readiness {
    fn new(state: ReadinessState) -> Self {
        Self {
            state,
            since: OffsetDateTime::now_utc(),
        }
    }

    pub fn creating() -> Self {
        Self::new(ReadinessState::Creating)
    }

    pub fn available() -> Self {
        Self::new(ReadinessState::Available)
    }

    pub fn deleting() -> Self {
        Self::new(ReadinessState::Deleting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_display() {
        assert_eq!(EntityKind::QualityGate.to_string(), "QualityGate");
        assert_eq!(
            EntityKind::QualityGateCondition.to_string(),
            "QualityGateCondition"
        );
    }

    #[test]
    fn readiness_serializes_state_lowercase() {
        let readiness = Readiness::available();
        let json = serde_json::to_value(&readiness).unwrap();
        assert_eq!(json["state"], "available");
    }

    #[test]
    fn meta_named_sets_only_the_name() {
        let meta = EntityMeta::named("main-gate");
        assert_eq!(meta.name, "main-gate");
        assert!(meta.labels.is_empty());
        assert!(!meta.deletion_requested);
    }
}
