mod webhook;

pub use webhook::{InboundResult, MessageContent, WebhookRequest};

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;

/// Outbound side of the messaging provider. `send_text` returns when the
/// provider has ACKed the submission or the request timeout elapsed; there
/// is no internal retry, the caller decides.
#[async_trait::async_trait]
pub trait IWhatsAppSender: Send + Sync {
    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()>;
}

pub trait IWebhookVerifier: Send + Sync {
    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool;
}

pub struct InfobipClient {
    base_url: String,
    api_key: String,
    sender: String,
    http: reqwest::Client,
}

impl InfobipClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            sender: sender.into(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client builds"),
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    from: &'a str,
    to: &'a str,
    content: TextContent<'a>,
}

#[derive(Serialize)]
struct TextContent<'a> {
    text: &'a str,
}

#[async_trait::async_trait]
impl IWhatsAppSender for InfobipClient {
    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()> {
        let request = SendRequest {
            messages: vec![TextMessage {
                from: &self.sender,
                to,
                content: TextContent { text },
            }],
        };

        let url = format!("{}/whatsapp/1/message/text", self.base_url);
        let res = self
            .http
            .post(&url)
            .header("Authorization", format!("App {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if status.is_client_error() || status.is_server_error() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("provider API error {}: {}", status, body);
        }
        Ok(())
    }
}

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over the raw request body, hex digest compared in constant
/// time. An empty secret accepts every payload (dev mode).
pub struct HmacWebhookVerifier {
    secret: String,
}

impl HmacWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl IWebhookVerifier for HmacWebhookVerifier {
    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool {
        if self.secret.is_empty() {
            return true;
        }
        let signature = match hex::decode(signature.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload);
        mac.verify_slice(&signature).is_ok()
    }
}
