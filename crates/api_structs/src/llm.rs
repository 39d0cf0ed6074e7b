use lembra_domain::{LlmModel, LlmProvider};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderDTO {
    pub name: String,
    pub description: String,
}

impl LlmProviderDTO {
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            name: provider.name,
            description: provider.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmModelDTO {
    pub provider: String,
    pub name: String,
    pub display_name: String,
    pub is_default: bool,
}

impl LlmModelDTO {
    pub fn new(model: LlmModel) -> Self {
        Self {
            provider: model.provider_name().to_string(),
            name: model.name,
            display_name: model.display_name,
            is_default: model.is_default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<LlmProviderDTO>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<LlmModelDTO>,
}
