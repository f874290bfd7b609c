//! The poll loop driving reconciliation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sonargate_client::DynQualityGates;
use sonargate_reconcile::{
    Action, ConditionClient, ExternalClient, GateClient, reconcile_once,
    resolver::resolve_gate_ref,
};
use sonargate_store::{ConditionRecord, EntityStore, GateRecord, MemoryStore};
use tokio::time::interval;
use tracing::{error, info, warn};

/// Counts of one sweep over every tracked entity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub reconciled: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Drives the reconcile cycle for every entity on a poll interval.
///
/// Entities are swept sequentially within a tick, which also guarantees
/// that two cycles for the same entity never overlap.
pub struct Controller {
    store: Arc<MemoryStore>,
    gates: GateClient,
    conditions: ConditionClient,
    poll_interval: Duration,
    state_file: Option<PathBuf>,
}

impl Controller {
    pub fn new(
        store: Arc<MemoryStore>,
        api: DynQualityGates,
        poll_interval: Duration,
        state_file: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            gates: GateClient::new(api.clone()),
            conditions: ConditionClient::new(api),
            poll_interval,
            state_file,
        }
    }

    /// Runs sweeps until a shutdown signal arrives.
    pub async fn run(&self) {
        let mut ticker = interval(self.poll_interval);
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "controller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let summary = self.sweep().await;
                    if summary.failed > 0 {
                        warn!(?summary, "sweep finished with failures");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        let _ = self.gates.disconnect().await;
        let _ = self.conditions.disconnect().await;
        self.persist().await;
    }

    /// Runs one sweep over every tracked entity.
    ///
    /// Conditions marked for deletion go first, while their parent gates
    /// still exist remotely; then gates, so freshly-created ones are
    /// resolvable; then the remaining conditions.
    pub async fn sweep(&self) -> SweepSummary {
        let mut summary = SweepSummary::default();

        match self.store.list_conditions().await {
            Ok(conditions) => {
                for record in conditions {
                    if record.meta.deletion_requested {
                        self.reconcile_condition(record, &mut summary).await;
                    }
                }
            }
            Err(err) => {
                error!(error = %err, "cannot list conditions");
                summary.failed += 1;
            }
        }

        match self.store.list_gates().await {
            Ok(gates) => {
                for record in gates {
                    self.reconcile_gate(record, &mut summary).await;
                }
            }
            Err(err) => {
                error!(error = %err, "cannot list quality gates");
                summary.failed += 1;
            }
        }

        match self.store.list_conditions().await {
            Ok(conditions) => {
                for record in conditions {
                    if !record.meta.deletion_requested {
                        self.reconcile_condition(record, &mut summary).await;
                    }
                }
            }
            Err(err) => {
                error!(error = %err, "cannot list conditions");
                summary.failed += 1;
            }
        }

        self.persist().await;
        summary
    }

    async fn reconcile_gate(&self, mut record: GateRecord, summary: &mut SweepSummary) {
        let name = record.meta.name.clone();
        summary.reconciled += 1;

        match reconcile_once(&self.gates, &mut record).await {
            Ok(outcome) => {
                count_action(outcome.action, summary);
                info!(kind = "QualityGate", name = %name, action = ?outcome.action, "reconciled");
                let result = if outcome.action == Action::Deleted {
                    self.store.remove(&name).await
                } else {
                    self.store.put_gate(record).await
                };
                if let Err(err) = result {
                    error!(kind = "QualityGate", name = %name, error = %err, "cannot persist record");
                }
            }
            Err(err) => {
                summary.failed += 1;
                warn!(
                    kind = "QualityGate",
                    name = %name,
                    error = %err,
                    retryable = err.is_retryable(),
                    "reconcile cycle failed"
                );
                // Keep whatever the cycle committed before failing, e.g.
                // an identity minted by a create whose default-flag
                // follow-up failed.
                if let Err(err) = self.store.put_gate(record).await {
                    error!(kind = "QualityGate", name = %name, error = %err, "cannot persist record");
                }
            }
        }
    }

    async fn reconcile_condition(&self, mut record: ConditionRecord, summary: &mut SweepSummary) {
        let name = record.meta.name.clone();
        summary.reconciled += 1;

        if !record.meta.deletion_requested
            && let Err(err) = resolve_gate_ref(self.store.as_ref(), &mut record.spec).await
        {
            summary.failed += 1;
            warn!(
                kind = "QualityGateCondition",
                name = %name,
                error = %err,
                retryable = err.is_retryable(),
                "cannot resolve gate reference"
            );
            return;
        }

        match reconcile_once(&self.conditions, &mut record).await {
            Ok(outcome) => {
                count_action(outcome.action, summary);
                info!(kind = "QualityGateCondition", name = %name, action = ?outcome.action, "reconciled");
                let result = if outcome.action == Action::Deleted {
                    self.store.remove(&name).await
                } else {
                    self.store.put_condition(record).await
                };
                if let Err(err) = result {
                    error!(kind = "QualityGateCondition", name = %name, error = %err, "cannot persist record");
                }
            }
            Err(err) => {
                summary.failed += 1;
                warn!(
                    kind = "QualityGateCondition",
                    name = %name,
                    error = %err,
                    retryable = err.is_retryable(),
                    "reconcile cycle failed"
                );
                if let Err(err) = self.store.put_condition(record).await {
                    error!(kind = "QualityGateCondition", name = %name, error = %err, "cannot persist record");
                }
            }
        }
    }

    async fn persist(&self) {
        if let Some(path) = &self.state_file
            && let Err(err) = self.store.save_snapshot(path).await
        {
            error!(path = %path.display(), error = %err, "cannot write state snapshot");
        }
    }
}

fn count_action(action: Action, summary: &mut SweepSummary) {
    match action {
        Action::None => {}
        Action::Created => summary.created += 1,
        Action::Updated => summary.updated += 1,
        Action::Deleted => summary.deleted += 1,
    }
}
