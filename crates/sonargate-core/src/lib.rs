//! # sonargate-core
//!
//! Domain types shared by every sonargate crate: desired specifications,
//! observed state, entity metadata, and the optional-field helpers used by
//! the comparators and late initializers.
//!
//! This crate is deliberately free of I/O. The remote API surface lives in
//! `sonargate-client`, persistence in `sonargate-store`, and the
//! reconciliation logic in `sonargate-reconcile`.

pub mod condition;
pub mod entity;
pub mod gate;
pub mod optional;

pub use condition::{ConditionObservation, ConditionOperator, ConditionSpec, GateRef, GateSelector};
pub use entity::{EntityKind, EntityMeta, Readiness, ReadinessState};
pub use gate::{GateActions, GateObservation, GateSpec};
pub use optional::{assign_if_none, eq_if_set};
