mod config;
mod metrics;
mod repos;
mod services;
mod system;

pub use config::{Config, Environment, LlmKeys, ProviderConfig};
pub use metrics::Metrics;
pub use repos::{
    IAllowedContactRepo, IEventRepo, IInboundMessageRepo, ILlmConfigRepo, IUserRepo, Repos,
};
pub use services::llm::{
    prompts, AnthropicClient, EnvLlmClientFactory, ILlmClient, ILlmClientFactory, LlmConfigError,
    OpenAiClient,
};
pub use services::whatsapp::{
    HmacWebhookVerifier, IWebhookVerifier, IWhatsAppSender, InfobipClient, WebhookRequest,
};
pub use services::Services;
pub use system::{ISys, RealSys};

use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct LembraContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
    pub metrics: Metrics,
}

impl LembraContext {
    pub fn create_inmemory(config: Config, services: Services) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys: Arc::new(RealSys {}),
            services,
            metrics: Metrics::new(),
        }
    }

    pub async fn create_postgres(
        config: Config,
        services: Services,
        connection_string: &str,
    ) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(connection_string).await?;
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            services,
            metrics: Metrics::new(),
        })
    }
}

/// Will setup the correct infra context given the environment
pub async fn setup_context() -> anyhow::Result<LembraContext> {
    let config = Config::from_env()?;

    let services = Services {
        whatsapp: Arc::new(InfobipClient::new(
            &config.provider.base_url,
            &config.provider.api_key,
            &config.provider.sender,
        )),
        webhook_verifier: Arc::new(HmacWebhookVerifier::new(&config.provider.webhook_secret)),
        llm_clients: Arc::new(EnvLlmClientFactory::new(config.llm.clone())),
    };

    match config.postgres_dsn.clone() {
        Some(dsn) => {
            info!("POSTGRES_DSN env var was provided. Going to use postgres.");
            LembraContext::create_postgres(config, services, &dsn).await
        }
        None => {
            warn!(
                "POSTGRES_DSN env var was not provided. Going to use inmemory repositories. This should only be used during development!"
            );
            Ok(LembraContext::create_inmemory(config, services))
        }
    }
}
