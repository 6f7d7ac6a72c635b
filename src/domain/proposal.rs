use crate::domain::types::{BudgetStatus, DealId, Potential, ProposalId, ProposalStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A requested commercial proposal tied to exactly one deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    /// Weak reference to the owning deal.
    pub deal_id: DealId,
    /// Display copy of the deal name taken at creation; never re-synced.
    pub deal_name: String,
    pub status: ProposalStatus,
    pub budget_status: BudgetStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<LastAction>,
    pub context: ProposalContext,
    pub ideas: ProposalIdeas,
    pub p_and_p: PotentialProbability,
}

/// Audit entry describing the most recent lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastAction {
    pub action: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalContext {
    pub business_context: String,
    pub client_needs: String,
    pub expected_results: String,
}

/// Selected services plus free-text ideas.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalIdeas {
    pub selected_ideas: Vec<String>,
    pub additional_ideas: String,
    pub implementation_ideas: String,
}

/// "P&P": potential and probability sizing estimates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialProbability {
    pub potential: Potential,
    pub estimated_value: Option<f64>,
    /// Probability in percent, 0 to 100.
    pub probability: Option<u8>,
    /// Formatted as `YYYY-MM-DD`.
    pub optimal_delivery_date: Option<NaiveDate>,
}

/// Caller-supplied fields of a proposal request.
///
/// `status` is accepted for compatibility with callers that send a full proposal
/// shape, but the store always overrides it with `in_development`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    pub deal_id: DealId,
    pub deal_name: String,
    #[serde(default)]
    pub status: Option<ProposalStatus>,
    #[serde(default)]
    pub budget_status: Option<BudgetStatus>,
    #[serde(default)]
    pub context: ProposalContext,
    #[serde(default)]
    pub ideas: ProposalIdeas,
    #[serde(default)]
    pub p_and_p: PotentialProbability,
}
