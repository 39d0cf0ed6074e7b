use super::IInboundMessageRepo;
use crate::repos::shared::inmemory_repo::*;
use lembra_domain::InboundMessage;
use std::sync::Mutex;

pub struct InMemoryInboundMessageRepo {
    messages: Mutex<Vec<InboundMessage>>,
}

impl InMemoryInboundMessageRepo {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IInboundMessageRepo for InMemoryInboundMessageRepo {
    async fn insert(&self, message: &InboundMessage) -> anyhow::Result<bool> {
        if self.exists(&message.provider_message_id).await {
            return Ok(false);
        }
        insert(message, &self.messages);
        Ok(true)
    }

    async fn exists(&self, provider_message_id: &str) -> bool {
        !find_by(&self.messages, |message| {
            message.provider_message_id == provider_message_id
        })
        .is_empty()
    }
}
