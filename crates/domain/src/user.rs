use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A `User` is identified by its messaging-provider number. It is created on
/// the first inbound message from a new number and carries the defaults that
/// fill unspecified reminder fields on new events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ID,
    pub wa_number: String,
    pub name: Option<String>,
    pub timezone: String,
    pub default_remind_before_minutes: i32,
    pub default_remind_frequency_minutes: i32,
    pub default_require_confirmation: bool,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub rate_limit_per_minute: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(wa_number: impl Into<String>, timezone: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ID::new(),
            wa_number: wa_number.into(),
            name: None,
            timezone: timezone.into(),
            default_remind_before_minutes: 30,
            default_remind_frequency_minutes: 15,
            default_require_confirmation: true,
            llm_provider: None,
            llm_model: None,
            rate_limit_per_minute: 30,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Falls back to UTC when the stored timezone is not a valid IANA name
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Per-user authorization entry: once a user has at least one
/// `AllowedContact`, only listed numbers may talk to its agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedContact {
    pub user_id: ID,
    pub contact_number: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_user_gets_reminder_defaults() {
        let user = User::new("+5511999999999", "America/Sao_Paulo", Utc::now());
        assert_eq!(user.default_remind_before_minutes, 30);
        assert_eq!(user.default_remind_frequency_minutes, 15);
        assert!(user.default_require_confirmation);
        assert!(user.is_active);
    }

    #[test]
    fn invalid_timezone_falls_back_to_utc() {
        let mut user = User::new("+5511999999999", "Not/AZone", Utc::now());
        assert_eq!(user.tz(), chrono_tz::UTC);
        user.timezone = "America/Sao_Paulo".into();
        assert_eq!(user.tz(), chrono_tz::America::Sao_Paulo);
    }
}
