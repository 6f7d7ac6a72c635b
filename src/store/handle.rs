//! Async access to the store with simulated round-trip latency.
//!
//! Mutations are serialized in the order they reach the lock. Each one waits
//! out its configured latency while holding the lock, then applies. The wait
//! and the apply run in a spawned task, so dropping the caller's future after
//! the operation has started does not cancel it.

use crate::config::LatencyConfig;
use crate::domain::{
    BudgetStatus, Deal, NewDeal, NewProposal, Proposal, ProposalId, ProposalStatus, StoreError,
};
use crate::store::{CommandOutcome, CrmStore, StoreCommand, StoreSnapshot, UpdateOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Cloneable async handle to a shared `CrmStore`.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<Mutex<CrmStore>>,
    latency: LatencyConfig,
    snapshot_rx: watch::Receiver<StoreSnapshot>,
}

impl StoreHandle {
    pub fn new(store: CrmStore, latency: LatencyConfig) -> Self {
        let snapshot_rx = store.subscribe();
        Self {
            store: Arc::new(Mutex::new(store)),
            latency,
            snapshot_rx,
        }
    }

    /// Applies any command after the latency configured for its kind.
    pub async fn apply(&self, command: StoreCommand) -> Result<CommandOutcome, StoreError> {
        let delay = self.latency_for(&command);
        self.run(delay, move |store| store.apply(command)).await
    }

    pub async fn create_deal(&self, fields: NewDeal) -> Result<Deal, StoreError> {
        self.run(self.latency.create_deal(), move |store| {
            store.create_deal(fields)
        })
        .await
    }

    pub async fn create_proposal(&self, fields: NewProposal) -> Result<Proposal, StoreError> {
        self.run(self.latency.create_proposal(), move |store| {
            store.create_proposal(fields)
        })
        .await
    }

    pub async fn update_proposal_status(
        &self,
        id: ProposalId,
        status: ProposalStatus,
        budget_status: BudgetStatus,
        comment: Option<String>,
    ) -> Result<UpdateOutcome, StoreError> {
        self.run(self.latency.update_status(), move |store| {
            store.update_proposal_status(&id, status, budget_status, comment)
        })
        .await
    }

    pub async fn approve(&self, id: ProposalId) -> Result<UpdateOutcome, StoreError> {
        self.run(self.latency.update_status(), move |store| store.approve(&id))
            .await
    }

    pub async fn send_feedback(
        &self,
        id: ProposalId,
        feedback: String,
    ) -> Result<UpdateOutcome, StoreError> {
        self.run(self.latency.update_status(), move |store| {
            store.send_feedback(&id, feedback)
        })
        .await
    }

    /// Latest committed state. Never blocks on an in-flight mutation.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot_rx.clone()
    }

    fn latency_for(&self, command: &StoreCommand) -> Duration {
        match command {
            StoreCommand::CreateDeal { .. } => self.latency.create_deal(),
            StoreCommand::CreateProposal { .. } => self.latency.create_proposal(),
            StoreCommand::UpdateProposalStatus { .. } => self.latency.update_status(),
            StoreCommand::Login { .. } | StoreCommand::Logout => Duration::ZERO,
        }
    }

    async fn run<T, F>(&self, delay: Duration, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CrmStore) -> Result<T, StoreError> + Send + 'static,
    {
        let guard = self.store.clone().lock_owned().await;
        let task = tokio::spawn(async move {
            let mut store = guard;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            op(&mut *store)
        });

        task.await
            .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
#[path = "tests/handle_tests.rs"]
mod tests;
