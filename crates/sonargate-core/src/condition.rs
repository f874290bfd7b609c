//! Quality gate condition desired state, observed state, and the reference
//! forms a condition may use to point at its parent gate.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a quality gate condition.
///
/// SonarQube supports exactly two operators for threshold conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// The measured value must not be lower than the threshold.
    #[serde(rename = "LT")]
    Lt,
    /// The measured value must not be greater than the threshold.
    #[serde(rename = "GT")]
    Gt,
}

impl ConditionOperator {
    /// Wire representation understood by the SonarQube API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lt => "LT",
            Self::Gt => "GT",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LT" => Ok(Self::Lt),
            "GT" => Ok(Self::Gt),
            other => Err(format!("unknown condition operator: {other}")),
        }
    }
}

/// Reference to a locally-tracked quality gate record by its record name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRef {
    pub name: String,
}

/// Label selector over locally-tracked quality gate records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSelector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

impl GateSelector {
    /// A record matches when all selector labels are present with equal
    /// values; an empty selector matches everything.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

/// Desired state of a quality gate condition.
///
/// Exactly one of `gate_name`, `gate_ref`, and `gate_selector` is expected
/// to be provided; the reference resolver turns the latter two into a
/// resolved `gate_name`. Once resolved, the gate reference is immutable for
/// the lifetime of the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Resolved name of the quality gate the condition belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_name: Option<String>,

    /// Reference to a locally-tracked quality gate record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_ref: Option<GateRef>,

    /// Selector for a locally-tracked quality gate record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_selector: Option<GateSelector>,

    /// Metric key the condition applies to.
    pub metric: String,

    /// Error threshold, string-encoded as the SonarQube API expects.
    pub error: String,

    /// Comparison operator; when unset, SonarQube picks the metric's
    /// natural direction and late initialization copies it back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<ConditionOperator>,
}

/// Observed state of a quality gate condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionObservation {
    /// Remote-assigned condition identifier.
    pub id: String,
    /// Metric key the condition applies to.
    pub metric: String,
    /// Error threshold.
    pub error: String,
    /// Comparison operator.
    pub op: ConditionOperator,
}
