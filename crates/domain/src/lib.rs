mod event;
mod llm;
mod message;
mod shared;
mod user;

pub use event::{
    Event, EventStatus, EventWithUser, MAX_LOCATION_LEN, MAX_NOTIFICATIONS_LIMIT,
    MAX_REMIND_BEFORE_MINUTES, MAX_REMIND_FREQUENCY_MINUTES, MAX_TITLE_LEN,
};
pub use llm::{LlmModel, LlmProvider};
pub use message::{
    EntityValidationError, EventEntities, EventIdentifier, InboundMessage, Intent, IntentEnvelope,
    ParsedMessage,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use user::{AllowedContact, User};
