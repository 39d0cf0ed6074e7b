use crate::llm::LlmModelDTO;
use chrono::{DateTime, Utc};
use lembra_domain::{AllowedContact, User, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDTO {
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

impl UserDTO {
    pub fn new(user: User) -> Self {
        Self {
            id: user.id,
            wa_number: user.wa_number,
            name: user.name,
            timezone: user.timezone,
            default_remind_before_minutes: user.default_remind_before_minutes,
            default_remind_frequency_minutes: user.default_remind_frequency_minutes,
            default_require_confirmation: user.default_require_confirmation,
            llm_provider: user.llm_provider,
            llm_model: user.llm_model,
            rate_limit_per_minute: user.rate_limit_per_minute,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub wa_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub default_remind_before_minutes: Option<i32>,
    pub default_remind_frequency_minutes: Option<i32>,
    pub default_require_confirmation: Option<bool>,
}

/// The user's LLM pick plus the model that pick currently resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfigDTO {
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub rate_limit_per_minute: i32,
    pub resolved_model: Option<LlmModelDTO>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserConfigRequest {
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub rate_limit_per_minute: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedContactDTO {
    pub contact_number: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AllowedContactDTO {
    pub fn new(contact: AllowedContact) -> Self {
        Self {
            contact_number: contact.contact_number,
            note: contact.note,
            created_at: contact.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAllowedContactRequest {
    pub contact_number: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedContactsResponse {
    pub contacts: Vec<AllowedContactDTO>,
}
