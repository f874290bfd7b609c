//! Declarative manifest of desired gates and conditions.
//!
//! The manifest is the user-facing edge of the persistence store: applying
//! it writes desired specifications into the store while preserving
//! everything the reconciler owns (external identities, observed status,
//! resolved references). Entities that disappear from the manifest are
//! marked for deletion; the next sweep removes their remote counterparts.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use sonargate_core::{ConditionSpec, EntityMeta, GateSpec};
use sonargate_store::{ConditionRecord, EntityStore, GateRecord, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Desired state of every tracked entity.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub gates: Vec<GateEntry>,
    #[serde(default)]
    pub conditions: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GateEntry {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub spec: GateSpec,
}

#[derive(Debug, Deserialize)]
pub struct ConditionEntry {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub spec: ConditionSpec,
}

/// Reads and validates a manifest file.
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let raw = std::fs::read_to_string(path)?;
    let manifest: Manifest = toml::from_str(&raw)?;
    validate(&manifest).map_err(ManifestError::Validation)?;
    Ok(manifest)
}

fn validate(manifest: &Manifest) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for name in manifest
        .gates
        .iter()
        .map(|g| &g.name)
        .chain(manifest.conditions.iter().map(|c| &c.name))
    {
        if !seen.insert(name) {
            return Err(format!("duplicate entity name: {name}"));
        }
    }
    for condition in &manifest.conditions {
        let spec = &condition.spec;
        if spec.gate_name.is_none() && spec.gate_ref.is_none() && spec.gate_selector.is_none() {
            return Err(format!(
                "condition {} does not reference a quality gate",
                condition.name
            ));
        }
    }
    Ok(())
}

/// Applies the manifest to the store.
///
/// Desired specifications and labels come from the manifest; external
/// identities, status, readiness, and already-resolved gate references are
/// preserved from the existing records. Records absent from the manifest
/// are marked for deletion rather than dropped, so their remote
/// counterparts get cleaned up first.
pub async fn apply(manifest: &Manifest, store: &dyn EntityStore) -> Result<(), StoreError> {
    let mut desired: BTreeSet<String> = BTreeSet::new();

    for entry in &manifest.gates {
        desired.insert(entry.name.clone());
        let record = match store.gate(&entry.name).await {
            Ok(mut existing) => {
                existing.meta.labels = entry.labels.clone();
                existing.meta.deletion_requested = false;
                existing.spec = entry.spec.clone();
                existing
            }
            Err(StoreError::NotFound { .. }) => {
                let mut meta = EntityMeta::named(&entry.name);
                meta.labels = entry.labels.clone();
                GateRecord::new(meta, entry.spec.clone())
            }
            Err(err) => return Err(err),
        };
        store.put_gate(record).await?;
    }

    for entry in &manifest.conditions {
        desired.insert(entry.name.clone());
        let record = match store.condition(&entry.name).await {
            Ok(mut existing) => {
                existing.meta.labels = entry.labels.clone();
                existing.meta.deletion_requested = false;
                let mut spec = entry.spec.clone();
                // The resolver's work is not undone by re-applying an
                // unresolved manifest entry.
                if spec.gate_name.is_none() {
                    spec.gate_name = existing.spec.gate_name.clone();
                }
                if spec.gate_ref.is_none() {
                    spec.gate_ref = existing.spec.gate_ref.clone();
                }
                existing.spec = spec;
                existing
            }
            Err(StoreError::NotFound { .. }) => {
                let mut meta = EntityMeta::named(&entry.name);
                meta.labels = entry.labels.clone();
                ConditionRecord::new(meta, entry.spec.clone())
            }
            Err(err) => return Err(err),
        };
        store.put_condition(record).await?;
    }

    for mut gate in store.list_gates().await? {
        if !desired.contains(&gate.meta.name) && !gate.meta.deletion_requested {
            tracing::info!(name = %gate.meta.name, "quality gate removed from manifest, marking for deletion");
            gate.meta.deletion_requested = true;
            store.put_gate(gate).await?;
        }
    }
    for mut condition in store.list_conditions().await? {
        if !desired.contains(&condition.meta.name) && !condition.meta.deletion_requested {
            tracing::info!(name = %condition.meta.name, "condition removed from manifest, marking for deletion");
            condition.meta.deletion_requested = true;
            store.put_condition(condition).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sonargate_core::ConditionOperator;
    use sonargate_store::MemoryStore;

    use super::*;

    const MANIFEST: &str = r#"
        [[gates]]
        name = "main"
        labels = { team = "core" }

        [gates.spec]
        name = "Main Gate"
        default = true

        [[conditions]]
        name = "coverage-min"

        [conditions.spec]
        gate_ref = { name = "main" }
        metric = "coverage"
        error = "80"
        op = "LT"
    "#;

    fn manifest() -> Manifest {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        validate(&manifest).unwrap();
        manifest
    }

    #[test]
    fn manifest_parses_gates_and_conditions() {
        let manifest = manifest();
        assert_eq!(manifest.gates.len(), 1);
        assert_eq!(manifest.gates[0].spec.default, Some(true));
        assert_eq!(manifest.conditions.len(), 1);
        assert_eq!(
            manifest.conditions[0].spec.op,
            Some(ConditionOperator::Lt)
        );
    }

    #[test]
    fn duplicate_names_fail_validation() {
        let manifest: Manifest = toml::from_str(
            r#"
            [[gates]]
            name = "dup"
            [gates.spec]
            name = "A"

            [[conditions]]
            name = "dup"
            [conditions.spec]
            gate_name = "A"
            metric = "coverage"
            error = "80"
            "#,
        )
        .unwrap();
        assert!(validate(&manifest).is_err());
    }

    #[test]
    fn condition_without_any_gate_reference_fails_validation() {
        let manifest: Manifest = toml::from_str(
            r#"
            [[conditions]]
            name = "floating"
            [conditions.spec]
            metric = "coverage"
            error = "80"
            "#,
        )
        .unwrap();
        assert!(validate(&manifest).is_err());
    }

    #[tokio::test]
    async fn apply_creates_records_for_new_entries() {
        let store = MemoryStore::new();
        apply(&manifest(), &store).await.unwrap();

        let gate = store.gate("main").await.unwrap();
        assert_eq!(gate.spec.name, "Main Gate");
        assert_eq!(gate.meta.labels.get("team").map(String::as_str), Some("core"));
        assert_eq!(gate.external_name, None);

        let condition = store.condition("coverage-min").await.unwrap();
        assert_eq!(condition.spec.metric, "coverage");
    }

    #[tokio::test]
    async fn apply_preserves_reconciler_owned_state() {
        let store = MemoryStore::new();
        apply(&manifest(), &store).await.unwrap();

        // Simulate reconciler work: identity assigned, reference resolved.
        let mut gate = store.gate("main").await.unwrap();
        gate.external_name = Some("Main Gate".to_string());
        store.put_gate(gate).await.unwrap();
        let mut condition = store.condition("coverage-min").await.unwrap();
        condition.external_name = Some("cond-1".to_string());
        condition.spec.gate_name = Some("Main Gate".to_string());
        store.put_condition(condition).await.unwrap();

        apply(&manifest(), &store).await.unwrap();

        let gate = store.gate("main").await.unwrap();
        assert_eq!(gate.external_name.as_deref(), Some("Main Gate"));
        let condition = store.condition("coverage-min").await.unwrap();
        assert_eq!(condition.external_name.as_deref(), Some("cond-1"));
        assert_eq!(condition.spec.gate_name.as_deref(), Some("Main Gate"));
    }

    #[tokio::test]
    async fn apply_marks_vanished_entries_for_deletion() {
        let store = MemoryStore::new();
        apply(&manifest(), &store).await.unwrap();

        let empty = Manifest::default();
        apply(&empty, &store).await.unwrap();

        let gate = store.gate("main").await.unwrap();
        assert!(gate.meta.deletion_requested);
        let condition = store.condition("coverage-min").await.unwrap();
        assert!(condition.meta.deletion_requested);
    }

    #[tokio::test]
    async fn apply_unmarks_restored_entries() {
        let store = MemoryStore::new();
        apply(&manifest(), &store).await.unwrap();
        apply(&Manifest::default(), &store).await.unwrap();
        apply(&manifest(), &store).await.unwrap();

        let gate = store.gate("main").await.unwrap();
        assert!(!gate.meta.deletion_requested);
    }
}
