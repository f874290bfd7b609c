//! The per-kind reconciliation seam.

use async_trait::async_trait;

use crate::error::Error;

/// What one Observe call learned about the remote counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    /// Whether the remote entity exists.
    pub exists: bool,
    /// Whether the desired specification matches the observed state.
    /// Meaningless when `exists` is false.
    pub up_to_date: bool,
    /// Whether observing filled previously-unset specification fields.
    pub late_initialized: bool,
}

impl Observation {
    /// The remote entity does not exist.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(up_to_date: bool, late_initialized: bool) -> Self {
        Self {
            exists: true,
            up_to_date,
            late_initialized,
        }
    }
}

/// One entity kind's view of its external counterpart.
///
/// Existence is recomputed by `observe` on every cycle; implementations
/// hold a remote API client and nothing else. All record mutations (the
/// external identity, observed status, readiness, late-initialized spec
/// fields) happen on the record passed in, only after the remote call
/// they depend on has succeeded.
#[async_trait]
pub trait ExternalClient: Send + Sync {
    type Record: Send;

    /// Checks whether the remote entity exists and matches the desired
    /// specification. A record without an external identity is absent
    /// without any remote call; a remote not-found answer is also absent,
    /// not an error.
    async fn observe(&self, record: &mut Self::Record) -> Result<Observation, Error>;

    /// Creates the remote entity and stores the identity the remote system
    /// assigned.
    async fn create(&self, record: &mut Self::Record) -> Result<(), Error>;

    /// Brings the remote entity in line with the desired specification.
    ///
    /// # Errors
    ///
    /// Fails with a precondition error when the record has no external
    /// identity yet; update before create is invalid.
    async fn update(&self, record: &mut Self::Record) -> Result<(), Error>;

    /// Deletes the remote entity. Deleting an entity that was never
    /// created succeeds without a remote call; on failure the identity is
    /// left untouched so a retry targets the same remote entity.
    async fn delete(&self, record: &mut Self::Record) -> Result<(), Error>;

    /// Releases held connection resources; always succeeds.
    async fn disconnect(&self) -> Result<(), Error> {
        Ok(())
    }
}
