use super::ILlmConfigRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::Utc;
use lembra_domain::{LlmModel, LlmProvider, ID};
use std::sync::Mutex;

pub struct InMemoryLlmConfigRepo {
    providers: Mutex<Vec<LlmProvider>>,
    models: Mutex<Vec<LlmModel>>,
}

impl InMemoryLlmConfigRepo {
    /// Seeded with the same reference rows the database migration creates,
    /// so the dev mode and the tests resolve a default model out of the box.
    pub fn new() -> Self {
        let now = Utc::now();
        let anthropic = LlmProvider {
            id: ID::new(),
            name: "anthropic".into(),
            description: "Anthropic Claude models".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let openai = LlmProvider {
            id: ID::new(),
            name: "openai".into(),
            description: "OpenAI GPT models".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let models = vec![
            LlmModel {
                id: ID::new(),
                provider_id: anthropic.id.clone(),
                name: "claude-3-5-sonnet-20241022".into(),
                display_name: "Claude 3.5 Sonnet".into(),
                is_active: true,
                is_default: true,
                created_at: now,
                updated_at: now,
                provider: Some(anthropic.clone()),
            },
            LlmModel {
                id: ID::new(),
                provider_id: openai.id.clone(),
                name: "gpt-4o-mini".into(),
                display_name: "GPT-4o mini".into(),
                is_active: true,
                is_default: false,
                created_at: now,
                updated_at: now,
                provider: Some(openai.clone()),
            },
        ];

        Self {
            providers: Mutex::new(vec![anthropic, openai]),
            models: Mutex::new(models),
        }
    }
}

#[async_trait::async_trait]
impl ILlmConfigRepo for InMemoryLlmConfigRepo {
    async fn find_default_model(&self) -> Option<LlmModel> {
        find_by(&self.models, |model| model.is_default && model.is_active)
            .into_iter()
            .next()
    }

    async fn find_model(&self, provider_name: &str, model_name: &str) -> Option<LlmModel> {
        find_by(&self.models, |model| {
            model.is_active
                && model.name == model_name
                && model.provider_name() == provider_name
                && model.provider.as_ref().map(|p| p.is_active).unwrap_or(false)
        })
        .into_iter()
        .next()
    }

    async fn list_active_providers(&self) -> Vec<LlmProvider> {
        find_by(&self.providers, |provider| provider.is_active)
    }

    async fn list_active_models_by_provider(&self, provider_name: &str) -> Vec<LlmModel> {
        find_by(&self.models, |model| {
            model.is_active && model.provider_name() == provider_name
        })
    }
}
