//! Quality gate condition reconciler.

use async_trait::async_trait;
use sonargate_client::{DynQualityGates, condition};
use sonargate_core::Readiness;
use sonargate_store::ConditionRecord;

use crate::error::Error;
use crate::external::{ExternalClient, Observation};

const ERR_SHOW_CONDITION: &str = "cannot get quality gate condition";
const ERR_CREATE_CONDITION: &str = "cannot create quality gate condition";
const ERR_UPDATE_CONDITION: &str = "cannot update quality gate condition";
const ERR_DELETE_CONDITION: &str = "cannot delete quality gate condition";

/// Reconciles condition records against the remote instance.
///
/// Conditions have no lookup endpoint of their own: observing one fetches
/// the parent gate and searches its condition list for the condition's
/// remote id. The parent reference must therefore be resolved (see
/// [`crate::resolver`]) before any remote operation.
pub struct ConditionClient {
    api: DynQualityGates,
}

impl ConditionClient {
    pub fn new(api: DynQualityGates) -> Self {
        Self { api }
    }
}

fn resolved_gate_name(record: &ConditionRecord) -> Result<String, Error> {
    record.spec.gate_name.clone().ok_or_else(|| {
        Error::reference_resolution(format!(
            "quality gate name is not resolved for condition {}",
            record.meta.name
        ))
    })
}

#[async_trait]
impl ExternalClient for ConditionClient {
    type Record = ConditionRecord;

    async fn observe(&self, record: &mut ConditionRecord) -> Result<Observation, Error> {
        let Some(external_id) = record.external_name.clone() else {
            return Ok(Observation::absent());
        };

        let gate_name = resolved_gate_name(record)?;

        let show = match self.api.show(&gate_name).await {
            Ok(show) => show,
            Err(err) if err.is_not_found() => return Ok(Observation::absent()),
            Err(err) => return Err(Error::remote(ERR_SHOW_CONDITION, err)),
        };

        // Absence from the parent's list means the condition was deleted
        // out-of-band.
        let observed = match condition::find_observation(&external_id, &show.conditions) {
            Ok(observed) => observed,
            Err(err) if err.is_not_found() => return Ok(Observation::absent()),
            Err(err) => return Err(Error::remote(ERR_SHOW_CONDITION, err)),
        };

        record.status = Some(observed.clone());
        record.readiness = Some(Readiness::available());

        let current = record.spec.clone();
        condition::late_initialize(&mut record.spec, &observed);

        Ok(Observation::present(
            condition::is_up_to_date(Some(&record.spec), Some(&observed)),
            record.spec != current,
        ))
    }

    async fn create(&self, record: &mut ConditionRecord) -> Result<(), Error> {
        record.readiness = Some(Readiness::creating());

        let gate_name = resolved_gate_name(record)?;

        let created = self
            .api
            .create_condition(&condition::create_request(&gate_name, &record.spec))
            .await
            .map_err(|e| Error::remote(ERR_CREATE_CONDITION, e))?;

        record.external_name = Some(created.id);

        Ok(())
    }

    async fn update(&self, record: &mut ConditionRecord) -> Result<(), Error> {
        let Some(external_id) = record.external_name.clone() else {
            return Err(Error::precondition(format!(
                "external id is not set for condition {}",
                record.meta.name
            )));
        };

        self.api
            .update_condition(&condition::update_request(&external_id, &record.spec))
            .await
            .map_err(|e| Error::remote(ERR_UPDATE_CONDITION, e))?;

        Ok(())
    }

    async fn delete(&self, record: &mut ConditionRecord) -> Result<(), Error> {
        record.readiness = Some(Readiness::deleting());

        let Some(external_id) = record.external_name.clone() else {
            return Ok(());
        };

        self.api
            .delete_condition(&external_id)
            .await
            .map_err(|e| Error::remote(ERR_DELETE_CONDITION, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sonargate_client::{ApiError, ConditionHandle, GateShow, WireCondition};
    use sonargate_core::{ConditionOperator, ConditionSpec, EntityMeta, ReadinessState};

    use super::*;
    use crate::fake::{Call, FakeQualityGates};

    fn record(
        external_id: Option<&str>,
        gate_name: Option<&str>,
        op: Option<ConditionOperator>,
    ) -> ConditionRecord {
        let mut record = ConditionRecord::new(
            EntityMeta::named("coverage-min"),
            ConditionSpec {
                gate_name: gate_name.map(str::to_string),
                gate_ref: None,
                gate_selector: None,
                metric: "coverage".to_string(),
                error: "80".to_string(),
                op,
            },
        );
        record.external_name = external_id.map(str::to_string);
        record
    }

    fn show_with_conditions(conditions: Vec<WireCondition>) -> GateShow {
        GateShow {
            name: "test-gate".to_string(),
            conditions,
            ..GateShow::default()
        }
    }

    fn wire(id: &str, error: &str) -> WireCondition {
        WireCondition {
            id: id.to_string(),
            metric: "coverage".to_string(),
            op: ConditionOperator::Lt,
            error: error.to_string(),
        }
    }

    #[tokio::test]
    async fn observe_without_identity_reports_absent_and_makes_no_call() {
        let api = Arc::new(FakeQualityGates::new());
        let client = ConditionClient::new(api.clone());
        let mut record = record(None, Some("test-gate"), None);

        let observation = client.observe(&mut record).await.unwrap();

        assert_eq!(observation, Observation::absent());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn observe_requires_a_resolved_gate_name() {
        let api = Arc::new(FakeQualityGates::new());
        let client = ConditionClient::new(api.clone());
        let mut record = record(Some("cond-123"), None, None);

        let err = client.observe(&mut record).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn observe_looks_up_the_parent_gate_by_resolved_name() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_show(Ok(show_with_conditions(vec![wire("cond-123", "80")])));
        let client = ConditionClient::new(api.clone());
        let mut record = record(Some("cond-123"), Some("test-gate"), None);

        let observation = client.observe(&mut record).await.unwrap();

        // Unset operator gets late-initialized from the observation.
        assert_eq!(observation, Observation::present(true, true));
        assert_eq!(record.spec.op, Some(ConditionOperator::Lt));
        assert_eq!(
            api.calls(),
            vec![Call::Show {
                name: "test-gate".to_string()
            }]
        );
        assert_eq!(
            record.readiness.as_ref().map(|r| r.state),
            Some(ReadinessState::Available)
        );
    }

    #[tokio::test]
    async fn observe_reports_absent_when_the_parent_list_lacks_the_id() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_show(Ok(show_with_conditions(vec![])));
        let client = ConditionClient::new(api);
        let mut record = record(Some("cond-123"), Some("test-gate"), None);

        let observation = client.observe(&mut record).await.unwrap();

        assert_eq!(observation, Observation::absent());
        // The identity survives: create will mint a fresh one.
        assert_eq!(record.external_name.as_deref(), Some("cond-123"));
    }

    #[tokio::test]
    async fn observe_reports_absent_when_the_parent_gate_is_gone() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_show(Err(ApiError::not_found("no such gate")));
        let client = ConditionClient::new(api);
        let mut record = record(Some("cond-123"), Some("test-gate"), None);

        let observation = client.observe(&mut record).await.unwrap();

        assert_eq!(observation, Observation::absent());
    }

    #[tokio::test]
    async fn observe_detects_threshold_drift() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_show(Ok(show_with_conditions(vec![wire("cond-123", "85")])));
        let client = ConditionClient::new(api);
        let mut record = record(
            Some("cond-123"),
            Some("test-gate"),
            Some(ConditionOperator::Lt),
        );

        let observation = client.observe(&mut record).await.unwrap();

        assert_eq!(observation, Observation::present(false, false));
    }

    #[tokio::test]
    async fn observe_wraps_transport_errors() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_show(Err(ApiError::Network("api error".to_string())));
        let client = ConditionClient::new(api);
        let mut record = record(Some("cond-123"), Some("test-gate"), None);

        let err = client.observe(&mut record).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Remote {
                op: "cannot get quality gate condition",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn create_stores_the_server_assigned_id() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_create_condition(Ok(ConditionHandle {
            id: "cond-123".to_string(),
        }));
        let client = ConditionClient::new(api.clone());
        let mut record = record(None, Some("test-gate"), Some(ConditionOperator::Lt));

        client.create(&mut record).await.unwrap();

        assert_eq!(record.external_name.as_deref(), Some("cond-123"));
        assert_eq!(
            api.calls(),
            vec![Call::CreateCondition {
                gate_name: "test-gate".to_string(),
                metric: "coverage".to_string(),
                error: "80".to_string(),
                op: Some(ConditionOperator::Lt),
            }]
        );
        assert_eq!(
            record.readiness.as_ref().map(|r| r.state),
            Some(ReadinessState::Creating)
        );
    }

    #[tokio::test]
    async fn create_requires_a_resolved_gate_name() {
        let api = Arc::new(FakeQualityGates::new());
        let client = ConditionClient::new(api.clone());
        let mut record = record(None, None, None);

        let err = client.create(&mut record).await.unwrap_err();

        assert!(matches!(err, Error::ReferenceResolution { .. }));
        assert!(api.calls().is_empty());
        assert_eq!(record.external_name, None);
    }

    #[tokio::test]
    async fn update_without_identity_is_a_precondition_error() {
        let api = Arc::new(FakeQualityGates::new());
        let client = ConditionClient::new(api.clone());
        let mut record = record(None, Some("test-gate"), None);

        let err = client.update(&mut record).await.unwrap_err();

        assert!(matches!(err, Error::Precondition { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn update_carries_every_mutable_field() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_update_condition(Ok(()));
        let client = ConditionClient::new(api.clone());
        let mut record = record(
            Some("cond-123"),
            Some("test-gate"),
            Some(ConditionOperator::Gt),
        );
        record.spec.error = "85".to_string();

        client.update(&mut record).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::UpdateCondition {
                id: "cond-123".to_string(),
                metric: "coverage".to_string(),
                error: "85".to_string(),
                op: Some(ConditionOperator::Gt),
            }]
        );
    }

    #[tokio::test]
    async fn delete_without_identity_succeeds_without_a_call() {
        let api = Arc::new(FakeQualityGates::new());
        let client = ConditionClient::new(api.clone());
        let mut record = record(None, Some("test-gate"), None);

        client.delete(&mut record).await.unwrap();

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_by_id_and_keeps_it_on_failure() {
        let api = Arc::new(FakeQualityGates::new());
        api.queue_delete_condition(Err(ApiError::Network("api error".to_string())));
        let client = ConditionClient::new(api.clone());
        let mut record = record(Some("cond-123"), Some("test-gate"), None);

        let err = client.delete(&mut record).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Remote {
                op: "cannot delete quality gate condition",
                ..
            }
        ));
        assert_eq!(record.external_name.as_deref(), Some("cond-123"));
        assert_eq!(
            api.calls(),
            vec![Call::DeleteCondition {
                id: "cond-123".to_string()
            }]
        );
    }
}
