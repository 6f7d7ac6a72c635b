//! The authoritative deal/proposal store.
//!
//! This module provides the ONLY place where deals and proposals are mutated.
//! Every mutation follows the same sequence:
//!
//! 1. journal the command
//! 2. build the next state from a copy of the current one
//! 3. mirror the next state to the storage slot
//! 4. swap it in and broadcast a snapshot to subscribers
//!
//! A mutation whose storage write fails is not committed, so the in-memory
//! state never runs ahead of what a restart would load.

mod commands;
mod events;
pub mod handle;
mod snapshot;
mod state;

pub use commands::StoreCommand;
pub use events::StoreEvent;
pub use handle::StoreHandle;
pub use snapshot::StoreSnapshot;
pub use state::CrmState;

use crate::config::StoreConfig;
use crate::domain::{
    BudgetStatus, Deal, DealId, LastAction, NewDeal, NewProposal, Proposal, ProposalId,
    ProposalStatus, StoreError, StoreServices,
};
use crate::persistence::StorageSlot;
use crate::seed;
use crate::status_policy::{self, TransitionMode, APPROVAL_COMMENT};
use crate::structured_logger::StructuredLogger;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of a status update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The proposal as committed after the transition.
    Updated(Box<Proposal>),
    /// No proposal has that id; nothing was changed or persisted.
    NotFound,
}

impl UpdateOutcome {
    pub fn proposal(&self) -> Option<&Proposal> {
        match self {
            UpdateOutcome::Updated(proposal) => Some(proposal.as_ref()),
            UpdateOutcome::NotFound => None,
        }
    }
}

/// Result of applying an arbitrary command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    DealCreated(Deal),
    ProposalCreated(Box<Proposal>),
    StatusUpdated(UpdateOutcome),
    SessionChanged,
}

/// Owns the state, applies commands, mirrors to storage, broadcasts snapshots.
pub struct CrmStore {
    state: Arc<CrmState>,
    slot: Option<StorageSlot>,
    services: StoreServices,
    actor: String,
    transition_mode: TransitionMode,
    snapshot_tx: watch::Sender<StoreSnapshot>,
    logger: Option<Arc<StructuredLogger>>,
    seq: u64,
}

impl CrmStore {
    /// Opens the store backed by `slot`.
    ///
    /// Loads the stored snapshot if there is one. Otherwise starts from demo
    /// data (when `seed_demo_data` is set) or from an empty state; seeded
    /// state is written to the slot immediately.
    ///
    /// Returns the store and a watch receiver for state snapshots.
    pub fn open(
        slot: StorageSlot,
        config: &StoreConfig,
        services: StoreServices,
        logger: Option<Arc<StructuredLogger>>,
    ) -> Result<(Self, watch::Receiver<StoreSnapshot>)> {
        let (initial, source) = match slot.load()? {
            Some(state) => (state, "storage"),
            None if config.seed_demo_data => {
                let state = seed::demo_state(services.clock.now());
                slot.save(&state)?;
                (state, "seed")
            }
            None => (CrmState::default(), "empty"),
        };

        info!(
            "Loaded store from {} ({} deals, {} proposals)",
            source,
            initial.deals.len(),
            initial.proposals.len()
        );
        if let Some(logger) = &logger {
            logger.log_state_loaded(source, initial.deals.len(), initial.proposals.len());
        }

        Ok(Self::build(initial, Some(slot), config, services, logger))
    }

    fn build(
        initial: CrmState,
        slot: Option<StorageSlot>,
        config: &StoreConfig,
        services: StoreServices,
        logger: Option<Arc<StructuredLogger>>,
    ) -> (Self, watch::Receiver<StoreSnapshot>) {
        let state = Arc::new(initial);
        let (snapshot_tx, snapshot_rx) = watch::channel(StoreSnapshot::new(state.clone()));

        let store = Self {
            state,
            slot,
            services,
            actor: config.actor.clone(),
            transition_mode: config.transition_mode,
            snapshot_tx,
            logger,
            seq: 0,
        };

        (store, snapshot_rx)
    }

    /// Dispatches a command to the matching operation.
    pub fn apply(&mut self, command: StoreCommand) -> Result<CommandOutcome, StoreError> {
        match command {
            StoreCommand::CreateDeal { fields } => {
                self.create_deal(fields).map(CommandOutcome::DealCreated)
            }
            StoreCommand::CreateProposal { fields } => self
                .create_proposal(fields)
                .map(|proposal| CommandOutcome::ProposalCreated(Box::new(proposal))),
            StoreCommand::UpdateProposalStatus {
                id,
                status,
                budget_status,
                comment,
            } => self
                .update_proposal_status(&id, status, budget_status, comment)
                .map(CommandOutcome::StatusUpdated),
            StoreCommand::Login { user_id } => {
                self.login(user_id).map(|()| CommandOutcome::SessionChanged)
            }
            StoreCommand::Logout => self.logout().map(|()| CommandOutcome::SessionChanged),
        }
    }

    /// Appends a deal with a fresh id and the current time.
    pub fn create_deal(&mut self, fields: NewDeal) -> Result<Deal, StoreError> {
        let command_seq = self.begin(&StoreCommand::CreateDeal {
            fields: fields.clone(),
        });

        let mut id = DealId::generate();
        while self.state.deal(&id).is_some() {
            id = DealId::generate();
        }
        let deal = Deal::from_new(id, fields, self.services.clock.now());

        let mut next = (*self.state).clone();
        next.deals.push(deal.clone());

        self.commit(
            command_seq,
            next,
            vec![StoreEvent::DealCreated {
                deal_id: deal.id.clone(),
            }],
        )?;
        Ok(deal)
    }

    /// Appends a proposal for an existing deal.
    ///
    /// The status is always `in_development`, whatever the caller sent. Budget
    /// status defaults to `not_assigned`.
    pub fn create_proposal(&mut self, fields: NewProposal) -> Result<Proposal, StoreError> {
        let command_seq = self.begin(&StoreCommand::CreateProposal {
            fields: fields.clone(),
        });

        if self.state.deal(&fields.deal_id).is_none() {
            warn!("Rejected proposal for unknown deal {}", fields.deal_id);
            return Err(StoreError::DealNotFound(fields.deal_id));
        }
        if let Some(value) = fields.p_and_p.estimated_value.filter(|v| !v.is_finite()) {
            warn!("Rejected proposal with estimated value {}", value);
            return Err(StoreError::InvalidEstimatedValue(value));
        }

        let NewProposal {
            deal_id,
            deal_name,
            status: requested_status,
            budget_status,
            context,
            ideas,
            p_and_p,
        } = fields;

        let mut id = ProposalId::generate();
        while self.state.proposal(&id).is_some() {
            id = ProposalId::generate();
        }

        let created_at = self.services.clock.now();
        let effects = status_policy::creation_effects(created_at);
        let proposal = Proposal {
            id,
            deal_id,
            deal_name,
            status: ProposalStatus::InDevelopment,
            budget_status: budget_status.unwrap_or(BudgetStatus::NotAssigned),
            created_at,
            estimated_delivery_date: effects.estimated_delivery,
            last_action: Some(LastAction {
                action: effects.action_label.to_string(),
                date: created_at,
                by: Some(self.actor.clone()),
                comments: None,
            }),
            context,
            ideas,
            p_and_p,
        };

        let mut events = vec![StoreEvent::ProposalCreated {
            proposal_id: proposal.id.clone(),
            deal_id: proposal.deal_id.clone(),
        }];
        if let Some(requested) = requested_status.filter(|s| *s != ProposalStatus::InDevelopment) {
            debug!(
                "Ignoring requested status {} for new proposal {}",
                requested, proposal.id
            );
            events.push(StoreEvent::RequestedStatusOverridden {
                proposal_id: proposal.id.clone(),
                requested,
            });
        }

        let mut next = (*self.state).clone();
        next.proposals.push(proposal.clone());

        self.commit(command_seq, next, events)?;
        Ok(proposal)
    }

    /// Moves a proposal to `status` and recomputes its derived fields.
    ///
    /// An unknown id yields `UpdateOutcome::NotFound` and leaves the store untouched.
    pub fn update_proposal_status(
        &mut self,
        id: &ProposalId,
        status: ProposalStatus,
        budget_status: BudgetStatus,
        comment: Option<String>,
    ) -> Result<UpdateOutcome, StoreError> {
        let command_seq = self.begin(&StoreCommand::UpdateProposalStatus {
            id: id.clone(),
            status,
            budget_status,
            comment: comment.clone(),
        });

        let Some(current) = self.state.proposal(id) else {
            debug!("Status update for unknown proposal {}", id);
            self.log_events(
                command_seq,
                &[StoreEvent::ProposalNotFound {
                    proposal_id: id.clone(),
                }],
            );
            return Ok(UpdateOutcome::NotFound);
        };

        let from = current.status;
        if !self.transition_mode.allows(from, status) {
            warn!("Rejected transition of {} from {} to {}", id, from, status);
            return Err(StoreError::TransitionRejected {
                id: id.clone(),
                from,
                to: status,
            });
        }

        let now = self.services.clock.now();
        let updated =
            status_policy::transition(current, status, budget_status, comment, &self.actor, now);

        let mut next = (*self.state).clone();
        next.proposals = self
            .state
            .proposals
            .iter()
            .map(|proposal| {
                if &proposal.id == id {
                    updated.clone()
                } else {
                    proposal.clone()
                }
            })
            .collect();

        self.commit(
            command_seq,
            next,
            vec![StoreEvent::ProposalStatusChanged {
                proposal_id: id.clone(),
                from,
                to: status,
                budget_status,
            }],
        )?;
        Ok(UpdateOutcome::Updated(Box::new(updated)))
    }

    /// Review action: completes the proposal, keeping its budget status.
    pub fn approve(&mut self, id: &ProposalId) -> Result<UpdateOutcome, StoreError> {
        let budget_status = self.current_budget_status(id);
        self.update_proposal_status(
            id,
            ProposalStatus::Completed,
            budget_status,
            Some(APPROVAL_COMMENT.to_string()),
        )
    }

    /// Review action: sends the proposal back for adjustment with feedback.
    pub fn send_feedback(
        &mut self,
        id: &ProposalId,
        feedback: String,
    ) -> Result<UpdateOutcome, StoreError> {
        let budget_status = self.current_budget_status(id);
        self.update_proposal_status(
            id,
            ProposalStatus::AdjustmentPending,
            budget_status,
            Some(feedback),
        )
    }

    pub fn login(&mut self, user_id: String) -> Result<(), StoreError> {
        let command_seq = self.begin(&StoreCommand::Login {
            user_id: user_id.clone(),
        });

        let mut next = (*self.state).clone();
        next.is_authenticated = true;
        next.user_id = Some(user_id.clone());

        self.commit(command_seq, next, vec![StoreEvent::LoggedIn { user_id }])
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        let command_seq = self.begin(&StoreCommand::Logout);

        let mut next = (*self.state).clone();
        next.is_authenticated = false;
        next.user_id = None;

        self.commit(command_seq, next, vec![StoreEvent::LoggedOut])
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn current_budget_status(&self, id: &ProposalId) -> BudgetStatus {
        self.state
            .proposal(id)
            .map(|p| p.budget_status)
            .unwrap_or_default()
    }

    fn begin(&mut self, command: &StoreCommand) -> u64 {
        self.seq += 1;
        if let Some(logger) = &self.logger {
            logger.log_command(self.seq, command);
        }
        self.seq
    }

    /// Mirrors `next` to storage, then swaps it in and broadcasts it.
    fn commit(
        &mut self,
        command_seq: u64,
        next: CrmState,
        events: Vec<StoreEvent>,
    ) -> Result<(), StoreError> {
        if let Some(slot) = &self.slot {
            if let Err(e) = slot.save(&next) {
                warn!("Failed to persist store state: {:#}", e);
                if let Some(logger) = &self.logger {
                    logger.log_persistence_failure(&format!("{:#}", e));
                }
                return Err(StoreError::Persistence(e));
            }
        }

        self.state = Arc::new(next);
        self.log_events(command_seq, &events);
        for event in &events {
            info!(?event, "Store mutation committed");
        }

        self.snapshot_tx.send_replace(StoreSnapshot::new(self.state.clone()));
        Ok(())
    }

    fn log_events(&self, command_seq: u64, events: &[StoreEvent]) {
        if let Some(logger) = &self.logger {
            for event in events {
                logger.log_event(command_seq, event);
            }
        }
    }
}

#[cfg(test)]
impl CrmStore {
    /// Creates a store that is never mirrored to storage.
    pub fn in_memory(
        initial: CrmState,
        config: &StoreConfig,
        services: StoreServices,
    ) -> (Self, watch::Receiver<StoreSnapshot>) {
        Self::build(initial, None, config, services, None)
    }

    pub fn deals(&self) -> &[Deal] {
        &self.state.deals
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.state.proposals
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::new(self.state.clone())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
