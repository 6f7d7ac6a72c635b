//! Proposal lifecycle policy.
//!
//! This module is the ONLY place that decides what a status change does to a
//! proposal: the action label written to `last_action`, and whether the
//! estimated delivery date is recomputed or cleared. It does not mutate store
//! state; the store commits the proposal this module returns.
//!
//! | target status        | action label              | estimated delivery |
//! |----------------------|---------------------------|--------------------|
//! | `in_development`     | "Proposal in development" | now + 5 days       |
//! | `ready_for_review`   | "Ready for review"        | cleared            |
//! | `adjustment_pending` | "Feedback sent"           | now + 5 days       |
//! | `completed`          | "Proposal completed"      | cleared            |

use crate::domain::{BudgetStatus, LastAction, Proposal, ProposalStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days between proposal creation and its first estimated delivery.
pub const INITIAL_DELIVERY_DAYS: i64 = 7;

/// Days granted whenever a proposal goes back into development.
pub const REWORK_DELIVERY_DAYS: i64 = 5;

/// Action label recorded when a proposal is created.
pub const PROPOSAL_STARTED: &str = "Proposal started";

/// Comment recorded by the approve review action.
pub const APPROVAL_COMMENT: &str = "Proposal approved";

/// Which status changes the store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Any status may be set from any status.
    #[default]
    Permissive,
    /// `completed` is terminal: it may only be re-applied, never left.
    Strict,
}

impl TransitionMode {
    pub fn allows(&self, from: ProposalStatus, to: ProposalStatus) -> bool {
        match self {
            TransitionMode::Permissive => true,
            TransitionMode::Strict => from != ProposalStatus::Completed || to == from,
        }
    }
}

/// Fields derived from a target status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEffects {
    pub action_label: &'static str,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Label written to `last_action.action` when a proposal moves to `target`.
pub fn action_label(target: ProposalStatus) -> &'static str {
    match target {
        ProposalStatus::InDevelopment => "Proposal in development",
        ProposalStatus::ReadyForReview => "Ready for review",
        ProposalStatus::AdjustmentPending => "Feedback sent",
        ProposalStatus::Completed => "Proposal completed",
    }
}

/// Delivery window opened by moving to `target`, if any.
pub fn delivery_window(target: ProposalStatus) -> Option<Duration> {
    match target {
        ProposalStatus::InDevelopment | ProposalStatus::AdjustmentPending => {
            Some(Duration::days(REWORK_DELIVERY_DAYS))
        }
        ProposalStatus::ReadyForReview | ProposalStatus::Completed => None,
    }
}

pub fn effects(target: ProposalStatus, now: DateTime<Utc>) -> TransitionEffects {
    TransitionEffects {
        action_label: action_label(target),
        estimated_delivery: delivery_window(target).map(|window| now + window),
    }
}

/// Effects of creating a proposal. Creation always lands in `in_development`.
pub fn creation_effects(created_at: DateTime<Utc>) -> TransitionEffects {
    TransitionEffects {
        action_label: PROPOSAL_STARTED,
        estimated_delivery: Some(created_at + Duration::days(INITIAL_DELIVERY_DAYS)),
    }
}

/// Returns `proposal` moved to `target` with every derived field recomputed.
///
/// Budget status is taken as given; it is never derived from the lifecycle.
pub fn transition(
    proposal: &Proposal,
    target: ProposalStatus,
    budget_status: BudgetStatus,
    comment: Option<String>,
    actor: &str,
    now: DateTime<Utc>,
) -> Proposal {
    let TransitionEffects {
        action_label,
        estimated_delivery,
    } = effects(target, now);

    Proposal {
        status: target,
        budget_status,
        estimated_delivery_date: estimated_delivery,
        last_action: Some(LastAction {
            action: action_label.to_string(),
            date: now,
            by: Some(actor.to_string()),
            comments: comment.filter(|c| !c.is_empty()),
        }),
        ..proposal.clone()
    }
}

#[cfg(test)]
#[path = "tests/status_policy_tests.rs"]
mod tests;
