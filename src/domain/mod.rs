//! Domain model for deals and proposals.
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): identifiers and status enumerations
//! - **Entities** (`deal.rs`, `proposal.rs`): persisted record shapes
//! - **Errors** (`errors.rs`): store command failures
//! - **Services** (`services.rs`): injected clock

pub mod deal;
pub mod errors;
pub mod proposal;
pub mod services;
pub mod types;

pub use deal::{Deal, NewDeal};
pub use errors::StoreError;
pub use proposal::{
    LastAction, NewProposal, PotentialProbability, Proposal, ProposalContext, ProposalIdeas,
};
#[cfg(test)]
pub use services::StoreClock;
pub use services::StoreServices;
pub use types::{BudgetStatus, DealId, Potential, ProposalId, ProposalStatus, StatusBoard};

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod types_tests;
