use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use crate::repos::user::InMemoryUserRepo;
use crate::repos::IUserRepo;
use chrono::{DateTime, Duration, Utc};
use lembra_domain::{Event, EventIdentifier, EventStatus, EventWithUser, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryEventRepo {
    events: Mutex<Vec<Event>>,
    users: Arc<InMemoryUserRepo>,
}

impl InMemoryEventRepo {
    pub fn new(users: Arc<InMemoryUserRepo>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            users,
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, event: &Event) -> anyhow::Result<()> {
        insert(event, &self.events);
        Ok(())
    }

    async fn save(&self, event: &Event) -> anyhow::Result<()> {
        save(event, &self.events);
        Ok(())
    }

    async fn delete(&self, event_id: &ID) -> Option<Event> {
        delete(event_id, &self.events)
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        find(event_id, &self.events)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Event> {
        let mut events = find_by(&self.events, |event| event.user_id == *user_id);
        events.sort_by_key(|event| event.starts_at);
        events
    }

    async fn find_by_user_and_range(
        &self,
        user_id: &ID,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Event> {
        let mut events = find_by(&self.events, |event| {
            event.user_id == *user_id && event.starts_at >= start && event.starts_at <= end
        });
        events.sort_by_key(|event| event.starts_at);
        events
    }

    async fn find_by_user_and_identifier(
        &self,
        user_id: &ID,
        identifier: &EventIdentifier,
    ) -> anyhow::Result<Vec<Event>> {
        let mut events = find_by(&self.events, |event| {
            if event.user_id != *user_id {
                return false;
            }
            if identifier.is_empty() {
                return true;
            }
            let id_match = identifier
                .event_id
                .as_ref()
                .map(|id| event.id == *id)
                .unwrap_or(false);
            let title_match = identifier
                .title
                .as_ref()
                .map(|title| event.title.to_lowercase().contains(&title.to_lowercase()))
                .unwrap_or(false);
            let date_match = identifier
                .date_hint
                .map(|date| event.starts_at.date_naive() == date)
                .unwrap_or(false);
            id_match || title_match || date_match
        });
        events.sort_by_key(|event| event.starts_at);
        Ok(events)
    }

    async fn find_pending_reminders(
        &self,
        now: DateTime<Utc>,
        lookahead: Duration,
    ) -> Vec<EventWithUser> {
        let window_end = now + lookahead;
        let mut events = find_by(&self.events, |event| {
            matches!(event.status, EventStatus::Scheduled | EventStatus::Confirmed)
                && !event.cap_reached()
                && event.reminder_due_at() <= window_end
                && event.starts_at >= now
                && event.frequency_gate_open(now)
        });
        events.sort_by_key(|event| event.starts_at);

        let mut pending = Vec::with_capacity(events.len());
        for event in events {
            if let Some(user) = self.users.find(&event.user_id).await {
                pending.push(EventWithUser { event, user });
            }
        }
        pending
    }
}
