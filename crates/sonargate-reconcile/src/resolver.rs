//! Resolution of a condition's gate reference.
//!
//! A condition may point at its parent gate three ways: an already-resolved
//! name (used as-is), a reference to a locally-tracked gate record, or a
//! label selector over gate records. Resolution turns the latter two into
//! the parent's external identity and pins the concrete reference that was
//! used, so later cycles re-resolve to the same parent.

use sonargate_core::{ConditionSpec, GateRef};
use sonargate_store::{EntityStore, GateRecord, StoreError};

use crate::error::Error;

/// Resolves the gate reference of a condition spec in place.
///
/// Idempotent: a spec whose `gate_name` is already set is left untouched.
///
/// # Errors
///
/// Fails with a reference-resolution error when the target gate does not
/// exist, the selector matches no gate or more than one, the referenced
/// gate has no external identity yet, or the spec carries no reference at
/// all.
pub async fn resolve_gate_ref(
    store: &dyn EntityStore,
    spec: &mut ConditionSpec,
) -> Result<(), Error> {
    if spec.gate_name.is_some() {
        return Ok(());
    }

    if let Some(reference) = spec.gate_ref.clone() {
        let gate = fetch_gate(store, &reference.name).await?;
        spec.gate_name = Some(external_name(&gate)?);
        return Ok(());
    }

    if let Some(selector) = spec.gate_selector.clone() {
        let matches: Vec<GateRecord> = store
            .list_gates()
            .await
            .map_err(Error::from)?
            .into_iter()
            .filter(|gate| selector.matches(&gate.meta.labels))
            .collect();

        return match matches.as_slice() {
            [] => Err(Error::reference_resolution(
                "no quality gate matches the selector",
            )),
            [gate] => {
                spec.gate_name = Some(external_name(gate)?);
                // Pin the concrete reference so the choice survives label
                // changes.
                spec.gate_ref = Some(GateRef {
                    name: gate.meta.name.clone(),
                });
                Ok(())
            }
            _ => Err(Error::reference_resolution(
                "selector matches more than one quality gate",
            )),
        };
    }

    Err(Error::reference_resolution(
        "condition does not reference a quality gate",
    ))
}

async fn fetch_gate(store: &dyn EntityStore, name: &str) -> Result<GateRecord, Error> {
    match store.gate(name).await {
        Ok(gate) => Ok(gate),
        Err(StoreError::NotFound { .. }) => Err(Error::reference_resolution(format!(
            "referenced quality gate {name} does not exist"
        ))),
        Err(err) => Err(Error::from(err)),
    }
}

fn external_name(gate: &GateRecord) -> Result<String, Error> {
    gate.external_name.clone().ok_or_else(|| {
        Error::reference_resolution(format!(
            "referenced quality gate {} has no external name yet",
            gate.meta.name
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sonargate_core::{EntityMeta, GateSelector, GateSpec};
    use sonargate_store::MemoryStore;

    use super::*;

    fn gate(name: &str, external: Option<&str>, labels: &[(&str, &str)]) -> GateRecord {
        let mut meta = EntityMeta::named(name);
        meta.labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut record = GateRecord::new(
            meta,
            GateSpec {
                name: format!("{name} display"),
                default: None,
            },
        );
        record.external_name = external.map(str::to_string);
        record
    }

    fn spec_with_ref(name: &str) -> ConditionSpec {
        ConditionSpec {
            gate_name: None,
            gate_ref: Some(GateRef {
                name: name.to_string(),
            }),
            gate_selector: None,
            metric: "coverage".to_string(),
            error: "80".to_string(),
            op: None,
        }
    }

    fn spec_with_selector(labels: &[(&str, &str)]) -> ConditionSpec {
        ConditionSpec {
            gate_name: None,
            gate_ref: None,
            gate_selector: Some(GateSelector {
                match_labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            }),
            metric: "coverage".to_string(),
            error: "80".to_string(),
            op: None,
        }
    }

    #[tokio::test]
    async fn already_resolved_name_is_a_no_op() {
        let store = MemoryStore::new();
        let mut spec = spec_with_ref("main");
        spec.gate_name = Some("Main Gate".to_string());

        resolve_gate_ref(&store, &mut spec).await.unwrap();

        assert_eq!(spec.gate_name.as_deref(), Some("Main Gate"));
    }

    #[tokio::test]
    async fn reference_resolves_to_the_parents_external_name() {
        let store = MemoryStore::new();
        store
            .put_gate(gate("main", Some("Main Gate"), &[]))
            .await
            .unwrap();
        let mut spec = spec_with_ref("main");

        resolve_gate_ref(&store, &mut spec).await.unwrap();

        assert_eq!(spec.gate_name.as_deref(), Some("Main Gate"));
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let store = MemoryStore::new();
        store
            .put_gate(gate("main", Some("Main Gate"), &[]))
            .await
            .unwrap();
        let mut spec = spec_with_ref("main");

        resolve_gate_ref(&store, &mut spec).await.unwrap();
        let once = spec.clone();
        // Even after the parent is renamed, a resolved spec stays put.
        store
            .put_gate(gate("main", Some("Renamed Gate"), &[]))
            .await
            .unwrap();
        resolve_gate_ref(&store, &mut spec).await.unwrap();

        assert_eq!(spec, once);
    }

    #[tokio::test]
    async fn missing_parent_fails_resolution() {
        let store = MemoryStore::new();
        let mut spec = spec_with_ref("missing");

        let err = resolve_gate_ref(&store, &mut spec).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
        assert!(err.is_retryable());
        assert_eq!(spec.gate_name, None);
    }

    #[tokio::test]
    async fn parent_without_external_name_fails_resolution() {
        let store = MemoryStore::new();
        store.put_gate(gate("main", None, &[])).await.unwrap();
        let mut spec = spec_with_ref("main");

        let err = resolve_gate_ref(&store, &mut spec).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
    }

    #[tokio::test]
    async fn selector_resolves_a_unique_match_and_pins_the_reference() {
        let store = MemoryStore::new();
        store
            .put_gate(gate("main", Some("Main Gate"), &[("team", "core")]))
            .await
            .unwrap();
        store
            .put_gate(gate("other", Some("Other Gate"), &[("team", "web")]))
            .await
            .unwrap();
        let mut spec = spec_with_selector(&[("team", "core")]);

        resolve_gate_ref(&store, &mut spec).await.unwrap();

        assert_eq!(spec.gate_name.as_deref(), Some("Main Gate"));
        assert_eq!(
            spec.gate_ref,
            Some(GateRef {
                name: "main".to_string()
            })
        );
    }

    #[tokio::test]
    async fn ambiguous_selector_fails_resolution() {
        let store = MemoryStore::new();
        store
            .put_gate(gate("a", Some("A"), &[("team", "core")]))
            .await
            .unwrap();
        store
            .put_gate(gate("b", Some("B"), &[("team", "core")]))
            .await
            .unwrap();
        let mut spec = spec_with_selector(&[("team", "core")]);

        let err = resolve_gate_ref(&store, &mut spec).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
        assert_eq!(spec.gate_name, None);
    }

    #[tokio::test]
    async fn selector_matching_nothing_fails_resolution() {
        let store = MemoryStore::new();
        let mut spec = spec_with_selector(&[("team", "core")]);

        let err = resolve_gate_ref(&store, &mut spec).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
    }

    #[tokio::test]
    async fn spec_without_any_reference_fails_resolution() {
        let store = MemoryStore::new();
        let mut spec = spec_with_ref("main");
        spec.gate_ref = None;

        let err = resolve_gate_ref(&store, &mut spec).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
    }
}
