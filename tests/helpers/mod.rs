use hmac::{Hmac, Mac};
use lembra_api::Application;
use lembra_domain::{IntentEnvelope, LlmModel};
use lembra_infra::{
    Config, HmacWebhookVerifier, ILlmClient, ILlmClientFactory, IWhatsAppSender, LembraContext,
    LlmConfigError, Services,
};
use sha2::Sha256;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    pub fn sent_to(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IWhatsAppSender for RecordingSender {
    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(())
    }
}

#[derive(Default, Debug)]
pub struct CannedLlm {
    responses: Mutex<VecDeque<IntentEnvelope>>,
}

impl CannedLlm {
    pub fn push(&self, envelope: IntentEnvelope) {
        self.responses.lock().unwrap().push_back(envelope);
    }
}

#[async_trait::async_trait]
impl ILlmClient for CannedLlm {
    async fn chat(
        &self,
        _system_prompt: &str,
        _user_message: &str,
    ) -> anyhow::Result<IntentEnvelope> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| IntentEnvelope::fallback("")))
    }
}

struct CannedLlmFactory {
    client: Arc<CannedLlm>,
}

impl ILlmClientFactory for CannedLlmFactory {
    fn create(&self, _model: &LlmModel) -> Result<Arc<dyn ILlmClient>, LlmConfigError> {
        Ok(self.client.clone())
    }
}

pub struct TestApp {
    pub address: String,
    pub webhook_secret: String,
    pub sender: Arc<RecordingSender>,
    pub llm: Arc<CannedLlm>,
}

// Launch the application as a background task on a random port
pub async fn spawn_app() -> TestApp {
    let sender = Arc::new(RecordingSender::default());
    let llm = Arc::new(CannedLlm::default());
    let webhook_secret = "test-webhook-secret".to_string();

    let services = Services {
        whatsapp: sender.clone(),
        webhook_verifier: Arc::new(HmacWebhookVerifier::new(&webhook_secret)),
        llm_clients: Arc::new(CannedLlmFactory {
            client: llm.clone(),
        }),
    };
    let mut config = Config::default();
    config.port = 0;
    let ctx = LembraContext::create_inmemory(config, services);

    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");
    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        address,
        webhook_secret,
        sender,
        llm,
    }
}

pub fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
