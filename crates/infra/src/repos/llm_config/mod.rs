mod inmemory;
mod postgres;

pub use inmemory::InMemoryLlmConfigRepo;
pub use postgres::PostgresLlmConfigRepo;

use lembra_domain::{LlmModel, LlmProvider, User};

#[async_trait::async_trait]
pub trait ILlmConfigRepo: Send + Sync {
    async fn find_default_model(&self) -> Option<LlmModel>;
    async fn find_model(&self, provider_name: &str, model_name: &str) -> Option<LlmModel>;
    async fn list_active_providers(&self) -> Vec<LlmProvider>;
    async fn list_active_models_by_provider(&self, provider_name: &str) -> Vec<LlmModel>;

    /// The user's pick when it resolves to an active model, otherwise the
    /// global default.
    async fn find_user_config(&self, user: &User) -> Option<LlmModel> {
        if let (Some(provider), Some(model)) = (&user.llm_provider, &user.llm_model) {
            if let Some(model) = self.find_model(provider, model).await {
                return Some(model);
            }
        }
        self.find_default_model().await
    }
}
