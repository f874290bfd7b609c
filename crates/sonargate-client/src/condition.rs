//! Quality gate condition mapping, comparison, and late initialization.

use sonargate_core::{ConditionObservation, ConditionSpec, assign_if_none, eq_if_set};

use crate::api::{CreateCondition, UpdateCondition, WireCondition};
use crate::error::ApiError;

/// Maps a single wire condition into the observed-state shape.
pub fn observation(wire: &WireCondition) -> ConditionObservation {
    ConditionObservation {
        id: wire.id.clone(),
        metric: wire.metric.clone(),
        error: wire.error.clone(),
        op: wire.op,
    }
}

/// Maps a gate's condition list, preserving order and length. An empty
/// input yields an empty, not absent, output.
pub fn observations(wire: &[WireCondition]) -> Vec<ConditionObservation> {
    wire.iter().map(observation).collect()
}

/// Finds a condition by its remote identifier in a gate's condition list.
///
/// Failing with a not-found error here is how a condition discovers it has
/// been deleted out-of-band: the parent's list simply no longer contains
/// its id.
pub fn find_observation(id: &str, wire: &[WireCondition]) -> Result<ConditionObservation, ApiError> {
    wire.iter()
        .find(|c| c.id == id)
        .map(observation)
        .ok_or_else(|| ApiError::not_found("condition not found in quality gate"))
}

/// Builds the creation payload for a condition. The parent gate name must
/// already be resolved; the caller owns that guarantee.
pub fn create_request(gate_name: &str, spec: &ConditionSpec) -> CreateCondition {
    CreateCondition {
        gate_name: gate_name.to_string(),
        metric: spec.metric.clone(),
        error: spec.error.clone(),
        op: spec.op,
    }
}

/// Builds the update payload for a condition keyed by its remote id.
pub fn update_request(id: &str, spec: &ConditionSpec) -> UpdateCondition {
    UpdateCondition {
        id: id.to_string(),
        metric: spec.metric.clone(),
        error: spec.error.clone(),
        op: spec.op,
    }
}

/// Whether the desired condition matches the observed one. The operator is
/// a don't-care while unset.
pub fn is_up_to_date(
    spec: Option<&ConditionSpec>,
    observation: Option<&ConditionObservation>,
) -> bool {
    let Some(spec) = spec else {
        return true;
    };
    let Some(observation) = observation else {
        return false;
    };

    if spec.error != observation.error {
        return false;
    }
    if spec.metric != observation.metric {
        return false;
    }

    eq_if_set(&spec.op, &observation.op)
}

/// Fills the unset operator from the observation; set fields stay as the
/// user wrote them.
pub fn late_initialize(spec: &mut ConditionSpec, observation: &ConditionObservation) {
    assign_if_none(&mut spec.op, observation.op);
}
