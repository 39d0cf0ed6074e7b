use chrono::{DateTime, Utc};
use lembra_domain::{Event, EventStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDTO {
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

impl EventDTO {
    pub fn new(event: Event) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            title: event.title,
            location: event.location,
            starts_at: event.starts_at,
            remind_before_minutes: event.remind_before_minutes,
            remind_frequency_minutes: event.remind_frequency_minutes,
            require_confirmation: event.require_confirmation,
            max_notifications: event.max_notifications,
            status: event.status,
            notifications_sent: event.notifications_sent,
            last_notified_at: event.last_notified_at,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remind_before_minutes: Option<i32>,
    #[serde(default)]
    pub remind_frequency_minutes: Option<i32>,
    #[serde(default)]
    pub require_confirmation: Option<bool>,
    #[serde(default)]
    pub max_notifications: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub remind_before_minutes: Option<i32>,
    pub remind_frequency_minutes: Option<i32>,
    pub require_confirmation: Option<bool>,
    pub max_notifications: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListEventsQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEventsResponse {
    pub events: Vec<EventDTO>,
}
