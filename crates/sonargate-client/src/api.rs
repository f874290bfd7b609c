//! Wire types and the operation trait for the SonarQube quality gate API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonargate_core::ConditionOperator;

use crate::error::ApiError;

/// Quality gate as returned by the show operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateShow {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_built_in: bool,
    #[serde(default)]
    pub is_ai_code_supported: bool,
    #[serde(default)]
    pub cayc_status: String,
    #[serde(default)]
    pub conditions: Vec<WireCondition>,
    #[serde(default)]
    pub actions: WireActions,
}

/// Condition entry inside a gate show response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireCondition {
    pub id: String,
    pub metric: String,
    pub op: ConditionOperator,
    pub error: String,
}

/// Permitted-action flags inside a gate show response.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireActions {
    #[serde(default)]
    pub associate_projects: bool,
    #[serde(default)]
    pub copy: bool,
    #[serde(default)]
    pub delegate: bool,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub manage_ai_code_assurance: bool,
    #[serde(default)]
    pub manage_conditions: bool,
    #[serde(default)]
    pub rename: bool,
    #[serde(default)]
    pub set_as_default: bool,
}

/// Creation payload for a quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateGate {
    pub name: String,
}

/// Identity assigned by the server when a quality gate is created.
///
/// The returned name is the durable key for all subsequent operations; the
/// server is authoritative for it.
#[derive(Debug, Clone, Deserialize)]
pub struct GateHandle {
    pub name: String,
}

/// Creation payload for a quality gate condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCondition {
    pub gate_name: String,
    pub metric: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<ConditionOperator>,
}

/// Identity assigned by the server when a condition is created.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionHandle {
    pub id: String,
}

/// Update payload for a quality gate condition. The id is immutable; every
/// mutable field is carried on each update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCondition {
    pub id: String,
    pub metric: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<ConditionOperator>,
}

/// The SonarQube quality gate operations the reconcilers depend on.
///
/// Implementations must be thread-safe; the HTTP implementation lives in
/// this crate, test fakes live next to the reconcilers that use them.
#[async_trait]
pub trait QualityGates: Send + Sync {
    /// Fetches a quality gate by name, including its conditions.
    async fn show(&self, name: &str) -> Result<GateShow, ApiError>;

    /// Creates a quality gate and returns the server-assigned identity.
    async fn create(&self, req: &CreateGate) -> Result<GateHandle, ApiError>;

    /// Renames a quality gate.
    async fn rename(&self, current_name: &str, new_name: &str) -> Result<(), ApiError>;

    /// Marks a quality gate as the instance default.
    async fn set_as_default(&self, name: &str) -> Result<(), ApiError>;

    /// Deletes a quality gate.
    async fn destroy(&self, name: &str) -> Result<(), ApiError>;

    /// Adds a condition to a quality gate and returns its identity.
    async fn create_condition(&self, req: &CreateCondition) -> Result<ConditionHandle, ApiError>;

    /// Updates an existing condition in place.
    async fn update_condition(&self, req: &UpdateCondition) -> Result<(), ApiError>;

    /// Removes a condition from its quality gate.
    async fn delete_condition(&self, id: &str) -> Result<(), ApiError>;
}

/// Type alias for a shared quality gate API client.
pub type DynQualityGates = Arc<dyn QualityGates>;
