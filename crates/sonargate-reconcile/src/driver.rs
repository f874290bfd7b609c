//! One full reconcile cycle for a single entity.

use sonargate_store::ManagedRecord;

use crate::error::Error;
use crate::external::{ExternalClient, Observation};

/// The remote operation a cycle ended up performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The entity existed and matched its specification.
    None,
    Created,
    Updated,
    Deleted,
}

/// Summary of a completed cycle, for logging and for the scheduler's
/// record bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub observation: Observation,
    pub action: Action,
}

/// Runs one Observe/Create/Update/Delete cycle.
///
/// Existence and up-to-dateness are recomputed from scratch; nothing is
/// carried over from previous cycles beyond what the record persists. The
/// driver performs no retry; a failed cycle is the scheduler's to rerun.
pub async fn reconcile_once<C>(client: &C, record: &mut C::Record) -> Result<CycleOutcome, Error>
where
    C: ExternalClient,
    C::Record: ManagedRecord,
{
    if record.meta().deletion_requested {
        // Observe first: an entity already gone remotely (deleted
        // out-of-band, or cascaded away with its parent) needs no call.
        let observation = client.observe(record).await?;
        if observation.exists {
            client.delete(record).await?;
        }
        return Ok(CycleOutcome {
            observation: Observation::absent(),
            action: Action::Deleted,
        });
    }

    let observation = client.observe(record).await?;

    if !observation.exists {
        client.create(record).await?;
        return Ok(CycleOutcome {
            observation,
            action: Action::Created,
        });
    }

    if !observation.up_to_date {
        client.update(record).await?;
        return Ok(CycleOutcome {
            observation,
            action: Action::Updated,
        });
    }

    Ok(CycleOutcome {
        observation,
        action: Action::None,
    })
}
