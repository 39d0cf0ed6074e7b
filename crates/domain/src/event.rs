use crate::shared::entity::{Entity, ID};
use crate::user::User;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_LEN: usize = 500;
pub const MAX_LOCATION_LEN: usize = 500;
pub const MAX_REMIND_BEFORE_MINUTES: i32 = 10_080;
pub const MAX_REMIND_FREQUENCY_MINUTES: i32 = 1_440;
pub const MAX_NOTIFICATIONS_LIMIT: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Confirmed,
    Canceled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }

    /// Terminal states cannot transition to anything else
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Completed)
    }
}

impl From<String> for EventStatus {
    fn from(value: String) -> Self {
        match &value[..] {
            "scheduled" => Self::Scheduled,
            "confirmed" => Self::Confirmed,
            "canceled" => Self::Canceled,
            "completed" => Self::Completed,
            _ => unreachable!("Invalid event status"),
        }
    }
}

/// An `Event` is a single appointment owned by exactly one `User`. The
/// reminder worker notifies the owner over the messaging provider from
/// `remind_before_minutes` before `starts_at`, at most every
/// `remind_frequency_minutes` and at most `max_notifications` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub remind_before_minutes: i32,
    pub remind_frequency_minutes: i32,
    pub require_confirmation: bool,
    pub max_notifications: i32,
    pub status: EventStatus,
    pub notifications_sent: i32,
    pub last_notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Event {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Event {
    /// The ideal moment for the first notification
    pub fn reminder_due_at(&self) -> DateTime<Utc> {
        self.starts_at - Duration::minutes(self.remind_before_minutes as i64)
    }

    pub fn is_reminder_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.reminder_due_at()
    }

    pub fn cap_reached(&self) -> bool {
        self.notifications_sent >= self.max_notifications
    }

    /// At least `remind_frequency_minutes` must elapse between two
    /// notifications for the same event.
    pub fn frequency_gate_open(&self, now: DateTime<Utc>) -> bool {
        match self.last_notified_at {
            None => true,
            Some(last) => last + Duration::minutes(self.remind_frequency_minutes as i64) <= now,
        }
    }

    pub fn register_notification(&mut self, now: DateTime<Utc>) {
        self.notifications_sent += 1;
        self.last_notified_at = Some(now);
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Aggregate materialized by the reminder scan: the event together with its
/// owner, so a tick never needs a second lookup.
#[derive(Debug, Clone)]
pub struct EventWithUser {
    pub event: Event,
    pub user: User,
}
