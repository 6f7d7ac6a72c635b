//! Read-only snapshot of store state.
//!
//! Readers NEVER mutate this; they receive new snapshots via watch channel.
//! A snapshot is always a whole committed state.

use crate::domain::{Deal, DealId, Proposal, StatusBoard};
#[cfg(test)]
use crate::domain::ProposalId;
use crate::store::CrmState;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    state: Arc<CrmState>,
}

impl StoreSnapshot {
    pub(crate) fn new(state: Arc<CrmState>) -> Self {
        Self { state }
    }

    pub fn deals(&self) -> &[Deal] {
        &self.state.deals
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.state.proposals
    }

    pub fn deal(&self, id: &DealId) -> Option<&Deal> {
        self.state.deal(id)
    }

    #[cfg(test)]
    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.state.proposal(id)
    }

    /// Proposals shown under `board`, in insertion order.
    pub fn board(&self, board: StatusBoard) -> Vec<&Proposal> {
        self.state.board(board)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn user_id(&self) -> Option<&str> {
        self.state.user_id.as_deref()
    }

    #[cfg(test)]
    pub fn state(&self) -> &CrmState {
        &self.state
    }
}
