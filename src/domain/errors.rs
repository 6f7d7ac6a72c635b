//! Error types for the deal/proposal store.

use crate::domain::types::{DealId, ProposalId, ProposalStatus};
use thiserror::Error;

/// Errors that can occur while applying a store command.
///
/// An unknown proposal id on a status update is not an error; it is reported
/// as `UpdateOutcome::NotFound`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A proposal was requested for a deal that is not in the deal collection.
    #[error("deal not found: {0}")]
    DealNotFound(DealId),
    /// Estimated values must be finite numbers.
    #[error("estimated value must be a finite number, got {0}")]
    InvalidEstimatedValue(f64),
    /// The transition guard refused the requested status change.
    #[error("transition of {id} from {from} to {to} rejected")]
    TransitionRejected {
        id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    },
    /// The committed state could not be mirrored to storage.
    #[error("storage failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
    /// The background task running the command panicked or was aborted.
    #[error("store task failed: {0}")]
    TaskFailed(String),
}
