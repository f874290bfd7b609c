//! Error taxonomy of the reconciliation engine.

use sonargate_client::ApiError;
use sonargate_store::StoreError;
use thiserror::Error;

/// Errors surfaced by a reconcile cycle.
///
/// Remote not-found is deliberately missing here: the engine recovers it
/// into an absent observation instead of surfacing it. Every remote
/// failure carries a static label naming the operation that failed;
/// credentials never appear in messages.
#[derive(Debug, Error)]
pub enum Error {
    /// A record of the wrong kind was handed over. Fatal; retrying cannot
    /// help.
    #[error("unexpected entity kind: {0}")]
    TypeMismatch(StoreError),

    /// The condition's gate reference could not be resolved. Retryable:
    /// the parent may simply not have been created yet.
    #[error("cannot resolve quality gate reference: {reason}")]
    ReferenceResolution { reason: String },

    /// An operation was invoked without the prior state it requires.
    #[error("{reason}")]
    Precondition { reason: String },

    /// A remote call failed for a reason other than absence.
    #[error("{op}: {source}")]
    Remote { op: &'static str, source: ApiError },

    /// The store itself failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl Error {
    pub fn reference_resolution(reason: impl Into<String>) -> Self {
        Self::ReferenceResolution {
            reason: reason.into(),
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    pub fn remote(op: &'static str, source: ApiError) -> Self {
        Self::Remote { op, source }
    }

    /// Whether the scheduler should expect a later cycle to succeed
    /// without operator intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TypeMismatch(_) | Self::Precondition { .. } => false,
            Self::ReferenceResolution { .. } | Self::Remote { .. } | Self::Store(_) => true,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            err @ StoreError::TypeMismatch { .. } => Self::TypeMismatch(err),
            other => Self::Store(other),
        }
    }
}
