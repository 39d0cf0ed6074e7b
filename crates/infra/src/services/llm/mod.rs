mod anthropic;
mod openai;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

use crate::config::LlmKeys;
use lembra_domain::{IntentEnvelope, LlmModel};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub(crate) const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const LLM_TEMPERATURE: f64 = 0.1;
pub(crate) const LLM_MAX_TOKENS: u32 = 1024;

/// One call: classify the user message and extract entities. The envelope
/// is returned verbatim; interpretation is the message pipeline's job.
#[async_trait::async_trait]
pub trait ILlmClient: Send + Sync + std::fmt::Debug {
    async fn chat(&self, system_prompt: &str, user_message: &str)
        -> anyhow::Result<IntentEnvelope>;
}

#[derive(Debug, Error)]
pub enum LlmConfigError {
    #[error("no LLM model is configured")]
    NoModelConfigured,
    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
    #[error("API key not found for provider {0}")]
    MissingApiKey(String),
}

/// Maps a resolved `LlmModel` row to a concrete client
pub trait ILlmClientFactory: Send + Sync {
    fn create(&self, model: &LlmModel) -> Result<Arc<dyn ILlmClient>, LlmConfigError>;
}

/// Factory backed by the API keys the process was started with
pub struct EnvLlmClientFactory {
    keys: LlmKeys,
}

impl EnvLlmClientFactory {
    pub fn new(keys: LlmKeys) -> Self {
        Self { keys }
    }
}

impl ILlmClientFactory for EnvLlmClientFactory {
    fn create(&self, model: &LlmModel) -> Result<Arc<dyn ILlmClient>, LlmConfigError> {
        match model.provider_name() {
            "anthropic" => {
                let api_key = self
                    .keys
                    .anthropic_api_key
                    .as_deref()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| LlmConfigError::MissingApiKey("anthropic".into()))?;
                Ok(Arc::new(AnthropicClient::new(api_key, &model.name)))
            }
            "openai" => {
                let api_key = self
                    .keys
                    .openai_api_key
                    .as_deref()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| LlmConfigError::MissingApiKey("openai".into()))?;
                Ok(Arc::new(OpenAiClient::new(api_key, &model.name)))
            }
            other => Err(LlmConfigError::UnsupportedProvider(other.into())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use lembra_domain::{LlmProvider, ID};

    fn model_for(provider_name: &str) -> LlmModel {
        let now = Utc::now();
        let provider = LlmProvider {
            id: ID::new(),
            name: provider_name.into(),
            description: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        LlmModel {
            id: ID::new(),
            provider_id: provider.id.clone(),
            name: "some-model".into(),
            display_name: "Some model".into(),
            is_active: true,
            is_default: true,
            created_at: now,
            updated_at: now,
            provider: Some(provider),
        }
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let factory = EnvLlmClientFactory::new(LlmKeys::default());
        let err = factory.create(&model_for("anthropic")).unwrap_err();
        assert!(matches!(err, LlmConfigError::MissingApiKey(_)));
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let factory = EnvLlmClientFactory::new(LlmKeys {
            anthropic_api_key: Some("key".into()),
            openai_api_key: Some("key".into()),
        });
        let err = factory.create(&model_for("mistral")).unwrap_err();
        assert!(matches!(err, LlmConfigError::UnsupportedProvider(_)));
    }

    #[test]
    fn known_providers_resolve() {
        let factory = EnvLlmClientFactory::new(LlmKeys {
            anthropic_api_key: Some("key".into()),
            openai_api_key: Some("key".into()),
        });
        assert!(factory.create(&model_for("anthropic")).is_ok());
        assert!(factory.create(&model_for("openai")).is_ok());
    }
}
