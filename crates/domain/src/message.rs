use crate::event::{
    MAX_LOCATION_LEN, MAX_NOTIFICATIONS_LIMIT, MAX_REMIND_BEFORE_MINUTES,
    MAX_REMIND_FREQUENCY_MINUTES, MAX_TITLE_LEN,
};
use crate::shared::entity::ID;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Append-only inbound log row. `provider_message_id` is the dedup key:
/// two webhook deliveries with the same id are processed at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: ID,
    pub provider_message_id: String,
    pub from_number: String,
    pub raw_payload: Value,
    pub processed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Provider-neutral view of one message extracted from a webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub received_at: DateTime<Utc>,
    pub kind: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateEvent,
    UpdateEvent,
    CancelEvent,
    ListEvents,
    ConfirmEvent,
    DeclineEvent,
    SmallTalk,
    #[serde(other)]
    Unknown,
}

/// The structured record the LLM must answer with: classification plus
/// extracted entities. Decoding is lenient on purpose since the producer is
/// a language model: every entity field is optional and unrecognized intents
/// collapse to `Unknown`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentEnvelope {
    pub intent: Intent,
    #[serde(default)]
    pub entities: EventEntities,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub follow_up_question: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl IntentEnvelope {
    /// An answer that is not valid JSON becomes an `Unknown` envelope with
    /// the raw text preserved in `notes`.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Self::fallback(raw))
    }

    pub fn fallback(raw: &str) -> Self {
        Self {
            intent: Intent::Unknown,
            entities: EventEntities::default(),
            confidence: 0.0,
            follow_up_question: None,
            notes: Some(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventEntities {
    pub title: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub participants: Option<Vec<String>>,
    pub remind_before_minutes: Option<i32>,
    pub remind_frequency_minutes: Option<i32>,
    pub require_confirmation: Option<bool>,
    pub max_notifications: Option<i32>,
    pub identifier: Option<EventIdentifier>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityValidationError {
    #[error("title must be non-empty and at most {MAX_TITLE_LEN} characters")]
    InvalidTitle,
    #[error("location must be at most {MAX_LOCATION_LEN} characters")]
    InvalidLocation,
    #[error("remind_before_minutes must be between 0 and {MAX_REMIND_BEFORE_MINUTES}")]
    InvalidRemindBefore,
    #[error("remind_frequency_minutes must be between 1 and {MAX_REMIND_FREQUENCY_MINUTES}")]
    InvalidRemindFrequency,
    #[error("max_notifications must be between 1 and {MAX_NOTIFICATIONS_LIMIT}")]
    InvalidMaxNotifications,
}

impl EventEntities {
    /// Range checks for everything the LLM may have extracted. Fields that
    /// are absent pass; the per-intent "required" rules live in the
    /// use-cases.
    pub fn validate(&self) -> Result<(), EntityValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() || title.chars().count() > MAX_TITLE_LEN {
                return Err(EntityValidationError::InvalidTitle);
            }
        }
        if let Some(location) = &self.location {
            if location.chars().count() > MAX_LOCATION_LEN {
                return Err(EntityValidationError::InvalidLocation);
            }
        }
        if let Some(minutes) = self.remind_before_minutes {
            if !(0..=MAX_REMIND_BEFORE_MINUTES).contains(&minutes) {
                return Err(EntityValidationError::InvalidRemindBefore);
            }
        }
        if let Some(minutes) = self.remind_frequency_minutes {
            if !(1..=MAX_REMIND_FREQUENCY_MINUTES).contains(&minutes) {
                return Err(EntityValidationError::InvalidRemindFrequency);
            }
        }
        if let Some(max) = self.max_notifications {
            if !(1..=MAX_NOTIFICATIONS_LIMIT).contains(&max) {
                return Err(EntityValidationError::InvalidMaxNotifications);
            }
        }
        Ok(())
    }
}

/// Partial specification used to locate an event under a user's scope.
/// Contributed predicates are OR-combined by the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventIdentifier {
    pub event_id: Option<ID>,
    pub title: Option<String>,
    pub date_hint: Option<NaiveDate>,
}

impl EventIdentifier {
    pub fn for_event(event_id: ID) -> Self {
        Self {
            event_id: Some(event_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.event_id.is_none() && self.title.is_none() && self.date_hint.is_none()
    }
}
