mod inmemory;
mod postgres;

pub use inmemory::InMemoryInboundMessageRepo;
pub use postgres::PostgresInboundMessageRepo;

use lembra_domain::InboundMessage;

#[async_trait::async_trait]
pub trait IInboundMessageRepo: Send + Sync {
    /// Appends to the inbound log. Returns `false` when a row with the same
    /// `provider_message_id` already exists, so a concurrent duplicate
    /// delivery is detectable without a failed statement.
    async fn insert(&self, message: &InboundMessage) -> anyhow::Result<bool>;
    async fn exists(&self, provider_message_id: &str) -> bool;
}
