pub mod llm;
pub mod whatsapp;

use llm::ILlmClientFactory;
use std::sync::Arc;
use whatsapp::{IWebhookVerifier, IWhatsAppSender};

/// The external collaborators reachable from the use-cases and the reminder
/// worker. Carried in the context so tests can swap in fakes.
#[derive(Clone)]
pub struct Services {
    pub whatsapp: Arc<dyn IWhatsAppSender>,
    pub webhook_verifier: Arc<dyn IWebhookVerifier>,
    pub llm_clients: Arc<dyn ILlmClientFactory>,
}
