//! Quality gate mapping, comparison, and late initialization.

use sonargate_core::{GateActions, GateObservation, GateSpec, assign_if_none, eq_if_set};

use crate::api::{CreateGate, GateShow, WireActions};
use crate::condition;

/// Builds the creation payload for a quality gate. The default flag is not
/// part of creation; it is asserted by a separate call after the gate
/// exists.
pub fn create_request(spec: &GateSpec) -> CreateGate {
    CreateGate {
        name: spec.name.clone(),
    }
}

/// Maps a show result into the observed-state shape.
pub fn observation(show: &GateShow) -> GateObservation {
    GateObservation {
        name: show.name.clone(),
        is_default: show.is_default,
        is_built_in: show.is_built_in,
        is_ai_code_supported: show.is_ai_code_supported,
        cayc_status: show.cayc_status.clone(),
        actions: actions_observation(&show.actions),
        conditions: condition::observations(&show.conditions),
    }
}

/// Maps the permitted-action flags of a show result.
pub fn actions_observation(actions: &WireActions) -> GateActions {
    GateActions {
        associate_projects: actions.associate_projects,
        copy: actions.copy,
        delegate: actions.delegate,
        delete: actions.delete,
        manage_ai_code_assurance: actions.manage_ai_code_assurance,
        manage_conditions: actions.manage_conditions,
        rename: actions.rename,
        set_as_default: actions.set_as_default,
    }
}

/// Whether the desired quality gate matches the observed one.
///
/// Nothing to enforce without a spec; nothing can match without an
/// observation. The default flag is a don't-care while unset.
pub fn is_up_to_date(spec: Option<&GateSpec>, observation: Option<&GateObservation>) -> bool {
    let Some(spec) = spec else {
        return true;
    };
    let Some(observation) = observation else {
        return false;
    };

    if spec.name != observation.name {
        return false;
    }

    eq_if_set(&spec.default, &observation.is_default)
}

/// Fills unset spec fields from the observation without overwriting
/// anything the user set. The observed default is copied as-is, true or
/// false.
pub fn late_initialize(spec: &mut GateSpec, observation: &GateObservation) {
    assign_if_none(&mut spec.default, observation.is_default);
}
