use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference row for an LLM vendor ("anthropic", "openai")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmProvider {
    pub id: ID,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for LlmProvider {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Reference row for a concrete model. A user picks one by
/// `(provider name, model name)`; unresolved picks fall back to the row
/// marked `is_default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmModel {
    pub id: ID,
    pub provider_id: ID,
    pub name: String,
    pub display_name: String,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined provider row, when the lookup materialized it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
}

impl LlmModel {
    pub fn provider_name(&self) -> &str {
        self.provider.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }
}

impl Entity for LlmModel {
    fn id(&self) -> &ID {
        &self.id
    }
}
