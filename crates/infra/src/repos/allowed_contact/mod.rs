mod inmemory;
mod postgres;

pub use inmemory::InMemoryAllowedContactRepo;
pub use postgres::PostgresAllowedContactRepo;

use lembra_domain::{AllowedContact, ID};

#[async_trait::async_trait]
pub trait IAllowedContactRepo: Send + Sync {
    /// Idempotent: re-adding an existing `(user, number)` pair is a no-op
    async fn insert(&self, contact: &AllowedContact) -> anyhow::Result<()>;
    /// Returns whether an entry was actually removed
    async fn delete(&self, user_id: &ID, contact_number: &str) -> bool;
    async fn find_by_user(&self, user_id: &ID) -> Vec<AllowedContact>;
    async fn is_allowed(&self, user_id: &ID, contact_number: &str) -> bool;
}
