use chrono::{DateTime, Utc};
use lembra_domain::ParsedMessage;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Raw webhook payload as delivered by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub results: Vec<InboundResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundResult {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub received_at: DateTime<Utc>,
    pub message: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationContent {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
}

impl WebhookRequest {
    /// Flattens the provider payload into provider-neutral messages, one per
    /// result, in delivery order.
    pub fn extract_messages(&self) -> Vec<ParsedMessage> {
        self.results
            .iter()
            .map(|result| {
                let mut message = ParsedMessage {
                    id: result.message_id.clone(),
                    from: result.from.clone(),
                    to: result.to.clone(),
                    received_at: result.received_at,
                    kind: result.message.kind.clone(),
                    text: String::new(),
                    media_url: None,
                    contact_name: result.contact.as_ref().map(|c| c.name.clone()),
                };

                match result.message.kind.as_str() {
                    "TEXT" => {
                        if let Some(text) = &result.message.text {
                            message.text = text.clone();
                        }
                    }
                    "IMAGE" => {
                        if let Some(image) = &result.message.image {
                            message.media_url = Some(image.url.clone());
                            if let Some(caption) = &image.caption {
                                message.text = caption.clone();
                            }
                        }
                    }
                    "LOCATION" => {
                        if let Some(location) = &result.message.location {
                            let mut data = json!({
                                "latitude": location.latitude,
                                "longitude": location.longitude,
                            });
                            if let Some(name) = &location.name {
                                data["name"] = json!(name);
                            }
                            if let Some(address) = &location.address {
                                data["address"] = json!(address);
                            }
                            message.text = data.to_string();
                        }
                    }
                    other => {
                        message.text = format!("Unsupported message type: {}", other);
                    }
                }

                message
            })
            .collect()
    }
}
