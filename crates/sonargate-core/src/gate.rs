//! Quality gate desired state and observed state.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionObservation;

/// Desired state of a quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSpec {
    /// Display name of the quality gate in SonarQube.
    pub name: String,

    /// Whether this quality gate should be the default one.
    ///
    /// SonarQube cannot unset the default quality gate directly; the only
    /// way to change the default is to set another gate as default. An
    /// unset or `false` value is therefore never asserted remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

/// Observed state of a quality gate, produced fresh on every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateObservation {
    /// Name of the quality gate as reported by SonarQube.
    pub name: String,
    /// Whether the quality gate is currently the default one.
    pub is_default: bool,
    /// Whether the quality gate is built-in (and therefore read-only).
    pub is_built_in: bool,
    /// Whether AI Code Assurance is supported for the quality gate.
    pub is_ai_code_supported: bool,
    /// Clean as You Code compliance status.
    pub cayc_status: String,
    /// Actions the authenticated user may perform on the quality gate.
    pub actions: GateActions,
    /// Conditions currently attached to the quality gate, in remote order.
    pub conditions: Vec<ConditionObservation>,
}

/// Permitted actions on a quality gate for the authenticated user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateActions {
    pub associate_projects: bool,
    pub copy: bool,
    pub delegate: bool,
    pub delete: bool,
    pub manage_ai_code_assurance: bool,
    pub manage_conditions: bool,
    pub rename: bool,
    pub set_as_default: bool,
}
