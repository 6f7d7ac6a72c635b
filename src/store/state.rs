//! The in-memory aggregate owned by the store.

use crate::domain::{Deal, DealId, Proposal, ProposalId, StatusBoard};
use serde::{Deserialize, Serialize};

/// Every collection and flag the store owns.
///
/// Collections are insertion-ordered and append-only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmState {
    pub deals: Vec<Deal>,
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl CrmState {
    pub fn deal(&self, id: &DealId) -> Option<&Deal> {
        self.deals.iter().find(|deal| &deal.id == id)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|proposal| &proposal.id == id)
    }

    /// Proposals shown under `board`, in insertion order.
    pub fn board(&self, board: StatusBoard) -> Vec<&Proposal> {
        self.proposals
            .iter()
            .filter(|proposal| board.contains(proposal.status))
            .collect()
    }
}
