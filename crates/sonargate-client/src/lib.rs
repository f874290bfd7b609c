//! # sonargate-client
//!
//! The remote API surface of the controller: the [`QualityGates`] trait
//! describing the SonarQube quality gate operations the reconcilers
//! consume, the reqwest-backed [`HttpQualityGates`] implementation, and the
//! pure per-entity logic that translates between wire results and domain
//! observations (mappers), decides whether desired state matches observed
//! state (comparators), and fills specification gaps from observed state
//! (late initializers).
//!
//! Transport concerns (TLS, timeouts, auth headers, error envelope
//! parsing) stay inside [`HttpQualityGates`]; everything else in this
//! crate is side-effect free.

pub mod api;
pub mod condition;
pub mod error;
pub mod gate;
mod http;

pub use api::{
    ConditionHandle, CreateCondition, CreateGate, DynQualityGates, GateHandle, GateShow,
    QualityGates, UpdateCondition, WireActions, WireCondition,
};
pub use error::ApiError;
pub use http::{HttpQualityGates, SonarConfig};
