mod inmemory;
mod postgres;

pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

use chrono::{DateTime, Duration, Utc};
use lembra_domain::{Event, EventIdentifier, EventWithUser, ID};

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, event: &Event) -> anyhow::Result<()>;
    /// Full overwrite by id
    async fn save(&self, event: &Event) -> anyhow::Result<()>;
    async fn delete(&self, event_id: &ID) -> Option<Event>;
    async fn find(&self, event_id: &ID) -> Option<Event>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<Event>;
    async fn find_by_user_and_range(
        &self,
        user_id: &ID,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Event>;
    /// Identifier predicates are OR-combined inside the mandatory
    /// `user_id` scope; results ordered by `starts_at` ascending.
    async fn find_by_user_and_identifier(
        &self,
        user_id: &ID,
        identifier: &EventIdentifier,
    ) -> anyhow::Result<Vec<Event>>;
    /// The reminder scan: active events below their notification cap whose
    /// ideal fire moment is at most `lookahead` away, that have not started
    /// yet and whose frequency gate is open at `now`. One round trip,
    /// owner joined in.
    async fn find_pending_reminders(
        &self,
        now: DateTime<Utc>,
        lookahead: Duration,
    ) -> Vec<EventWithUser>;
}
