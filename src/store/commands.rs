//! Commands that can mutate store state.
//!
//! All state changes MUST go through `CrmStore`; these values are what the
//! store journals before applying them.

use crate::domain::{BudgetStatus, NewDeal, NewProposal, ProposalId, ProposalStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StoreCommand {
    // Entity creation
    /// Append a new deal
    CreateDeal { fields: NewDeal },
    /// Append a new proposal in `in_development`
    CreateProposal { fields: NewProposal },

    // Lifecycle
    /// Move a proposal to a status and record the last action
    UpdateProposalStatus {
        id: ProposalId,
        status: ProposalStatus,
        budget_status: BudgetStatus,
        comment: Option<String>,
    },

    // Session flag
    Login { user_id: String },
    Logout,
}
