use super::{ILlmClient, LLM_MAX_TOKENS, LLM_REQUEST_TIMEOUT, LLM_TEMPERATURE};
use anyhow::Context;
use lembra_domain::IntentEnvelope;
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(LLM_REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client builds"),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl ILlmClient for AnthropicClient {
    async fn chat(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> anyhow::Result<IntentEnvelope> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: LLM_MAX_TOKENS,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
            temperature: LLM_TEMPERATURE,
        };

        let res = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("anthropic API error {}: {}", status, body);
        }

        let response: MessagesResponse =
            res.json().await.context("anthropic response decoding")?;
        let content = response
            .content
            .first()
            .map(|block| block.text.as_str())
            .ok_or_else(|| anyhow::anyhow!("empty response from anthropic"))?;

        Ok(IntentEnvelope::parse(content))
    }
}
