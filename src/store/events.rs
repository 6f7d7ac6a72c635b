//! Events emitted by the store after processing commands.
//!
//! These are for journaling and diagnostics only. Readers get state through
//! `StoreSnapshot`.

use crate::domain::{BudgetStatus, DealId, ProposalId, ProposalStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    DealCreated {
        deal_id: DealId,
    },
    ProposalCreated {
        proposal_id: ProposalId,
        deal_id: DealId,
    },
    /// The caller sent a status on creation; it was replaced by `in_development`
    RequestedStatusOverridden {
        proposal_id: ProposalId,
        requested: ProposalStatus,
    },
    ProposalStatusChanged {
        proposal_id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
        budget_status: BudgetStatus,
    },
    /// Status update for an id that is not in the collection; nothing changed
    ProposalNotFound {
        proposal_id: ProposalId,
    },
    LoggedIn {
        user_id: String,
    },
    LoggedOut,
}
