use chrono::{DateTime, TimeZone, Utc};
use lembra_domain::{IntentEnvelope, LlmModel, User};
use lembra_infra::{
    Config, HmacWebhookVerifier, ILlmClient, ILlmClientFactory, ISys, IWhatsAppSender,
    LembraContext, LlmConfigError, Services,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Sender that records every outbound message. `fail_next` makes exactly one
/// send be rejected, for retry-path tests.
#[derive(Default)]
pub struct FakeSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_next: AtomicBool,
}

impl FakeSender {
    pub fn sent_to(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IWhatsAppSender for FakeSender {
    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("provider rejected the send");
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(())
    }
}

/// LLM stub answering from a queue of canned envelopes
#[derive(Default, Debug)]
pub struct FakeLlm {
    pub responses: Mutex<VecDeque<IntentEnvelope>>,
    pub fail_next: AtomicBool,
}

impl FakeLlm {
    pub fn push(&self, envelope: IntentEnvelope) {
        self.responses.lock().unwrap().push_back(envelope);
    }
}

#[async_trait::async_trait]
impl ILlmClient for FakeLlm {
    async fn chat(
        &self,
        _system_prompt: &str,
        _user_message: &str,
    ) -> anyhow::Result<IntentEnvelope> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("llm unavailable");
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| IntentEnvelope::fallback("")))
    }
}

pub struct FakeLlmFactory {
    pub client: Arc<FakeLlm>,
    pub fail: AtomicBool,
}

impl ILlmClientFactory for FakeLlmFactory {
    fn create(&self, _model: &LlmModel) -> Result<Arc<dyn ILlmClient>, LlmConfigError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LlmConfigError::MissingApiKey("anthropic".into()));
        }
        Ok(self.client.clone())
    }
}

/// Settable clock
pub struct FakeSys {
    now: Mutex<DateTime<Utc>>,
}

impl FakeSys {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl ISys for FakeSys {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct TestHarness {
    pub ctx: LembraContext,
    pub sender: Arc<FakeSender>,
    pub llm: Arc<FakeLlm>,
    pub llm_factory: Arc<FakeLlmFactory>,
    pub sys: Arc<FakeSys>,
}

/// In-memory context wired to fakes, clock pinned at 2025-08-20 12:00 UTC
pub fn setup() -> TestHarness {
    let sender = Arc::new(FakeSender::default());
    let llm = Arc::new(FakeLlm::default());
    let llm_factory = Arc::new(FakeLlmFactory {
        client: llm.clone(),
        fail: AtomicBool::new(false),
    });
    let sys = Arc::new(FakeSys::new(
        Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap(),
    ));

    let services = Services {
        whatsapp: sender.clone(),
        webhook_verifier: Arc::new(HmacWebhookVerifier::new("")),
        llm_clients: llm_factory.clone(),
    };
    let mut ctx = LembraContext::create_inmemory(Config::default(), services);
    ctx.sys = sys.clone();

    TestHarness {
        ctx,
        sender,
        llm,
        llm_factory,
        sys,
    }
}

pub async fn seed_user(ctx: &LembraContext, wa_number: &str, timezone: &str) -> User {
    let user = User::new(wa_number, timezone, ctx.sys.now());
    ctx.repos.users.insert(&user).await.unwrap();
    user
}
