//! Strongly typed domain primitives for deals and proposals.
//!
//! Identifiers are newtypes over `String` so that seeded records (`deal-1`) and
//! generated records (`deal-<uuid>`) share one representation. Enumerations use
//! snake_case wire names, which is the layout of the persisted snapshot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a deal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(pub String);

impl DealId {
    /// Creates a new random deal ID.
    pub fn generate() -> Self {
        Self(format!("deal-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DealId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DealId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for DealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub String);

impl ProposalId {
    /// Creates a new random proposal ID.
    pub fn generate() -> Self {
        Self(format!("proposal-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProposalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProposalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    InDevelopment,
    ReadyForReview,
    AdjustmentPending,
    Completed,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 4] = [
        ProposalStatus::InDevelopment,
        ProposalStatus::ReadyForReview,
        ProposalStatus::AdjustmentPending,
        ProposalStatus::Completed,
    ];

    /// Wire name as stored in the snapshot.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::InDevelopment => "in_development",
            ProposalStatus::ReadyForReview => "ready_for_review",
            ProposalStatus::AdjustmentPending => "adjustment_pending",
            ProposalStatus::Completed => "completed",
        }
    }

    /// Tracking board this status is shown under.
    pub fn board(&self) -> StatusBoard {
        match self {
            ProposalStatus::InDevelopment | ProposalStatus::AdjustmentPending => {
                StatusBoard::InDevelopment
            }
            ProposalStatus::ReadyForReview => StatusBoard::InReview,
            ProposalStatus::Completed => StatusBoard::Completed,
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown proposal status '{}'", s))
    }
}

/// Budget status of a proposal. Caller-supplied, never derived from lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    NotAssigned,
    InReview,
    Ready,
}

impl BudgetStatus {
    pub const ALL: [BudgetStatus; 3] = [
        BudgetStatus::NotAssigned,
        BudgetStatus::InReview,
        BudgetStatus::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::NotAssigned => "not_assigned",
            BudgetStatus::InReview => "in_review",
            BudgetStatus::Ready => "ready",
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BudgetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown budget status '{}'", s))
    }
}

/// Qualitative potential tier of the P&P block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Potential {
    High,
    #[default]
    Medium,
    Low,
}

impl std::str::FromStr for Potential {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Potential::High),
            "medium" => Ok(Potential::Medium),
            "low" => Ok(Potential::Low),
            other => Err(format!("unknown potential '{}'", other)),
        }
    }
}

/// Grouping of proposal statuses used by tracking views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBoard {
    InDevelopment,
    InReview,
    Completed,
}

impl StatusBoard {
    pub fn contains(&self, status: ProposalStatus) -> bool {
        status.board() == *self
    }
}
