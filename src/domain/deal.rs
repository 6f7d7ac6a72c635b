use crate::domain::types::DealId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sales opportunity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub name: String,
    pub company: String,
    pub contact: String,
    pub position: String,
    /// Profit-center classification (catalog id or label).
    pub profit_center: String,
    /// Lead-source classification.
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of a deal; id and creation time are assigned by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub name: String,
    pub company: String,
    pub contact: String,
    pub position: String,
    pub profit_center: String,
    pub source: String,
}

impl Deal {
    pub fn from_new(id: DealId, fields: NewDeal, created_at: DateTime<Utc>) -> Self {
        let NewDeal {
            name,
            company,
            contact,
            position,
            profit_center,
            source,
        } = fields;
        Self {
            id,
            name,
            company,
            contact,
            position,
            profit_center,
            source,
            created_at,
        }
    }
}
