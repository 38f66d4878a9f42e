// Inbound Evolution API webhook: payload types and restaurant resolution

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phone;
use crate::restaurants::RestaurantService;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    MessagesUpsert,
    ConnectionUpdate,
    Other(String),
}

impl WebhookEvent {
    /// `MESSAGES_UPSERT` and `messages.upsert` name the same event
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace('_', ".");
        match normalized.as_str() {
            "messages.upsert" => WebhookEvent::MessagesUpsert,
            "connection.update" => WebhookEvent::ConnectionUpdate,
            _ => WebhookEvent::Other(normalized),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    pub remote_jid: String,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedText {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(default)]
    pub extended_text_message: Option<ExtendedText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub key: MessageKey,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default)]
    pub message: Option<MessageContent>,
}

impl MessageData {
    /// Text of plain or extended text messages; None for media and others
    pub fn text(&self) -> Option<&str> {
        let content = self.message.as_ref()?;
        content
            .conversation
            .as_deref()
            .or_else(|| content.extended_text_message.as_ref().map(|e| e.text.as_str()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionData {
    #[serde(default)]
    pub instance: Option<String>,
    pub state: String,
}

/// What the webhook answers; always sent with HTTP 200
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ignored: None,
            error: None,
        }
    }

    pub fn ignored(reason: &str) -> Self {
        Self {
            success: true,
            ignored: Some(reason.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            ignored: None,
            error: Some(error.to_string()),
        }
    }
}

/// A text message worth answering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingText {
    pub phone: String,
    pub text: String,
    pub push_name: Option<String>,
}

/// Filters a `messages.upsert` payload down to an answerable text message
///
/// Err carries the reason the message is ignored.
pub fn extract_incoming_text(data: &serde_json::Value) -> Result<IncomingText, &'static str> {
    let message: MessageData =
        serde_json::from_value(data.clone()).map_err(|_| "malformed_message")?;

    if message.key.from_me {
        return Err("from_me");
    }
    if phone::is_group_jid(&message.key.remote_jid) {
        return Err("group_message");
    }
    let text = message.text().ok_or("unsupported_message_type")?;
    let phone = phone::from_remote_jid(&message.key.remote_jid);
    if phone.is_empty() {
        return Err("missing_sender");
    }

    Ok(IncomingText {
        phone,
        text: text.to_string(),
        push_name: message.push_name.clone(),
    })
}

/// UUID at the end of an instance name such as `restaurant-<uuid>`
pub fn uuid_suffix(instance_name: &str) -> Option<Uuid> {
    let start = instance_name.len().checked_sub(36)?;
    instance_name
        .get(start..)
        .and_then(|suffix| Uuid::parse_str(suffix).ok())
}

/// Deterministic id derived from the last `-` segment of an instance name
///
/// Keeps its hex digits, truncates or right-pads with zeros to 32 and formats as a UUID.
pub fn padded_uuid(instance_name: &str) -> Uuid {
    let segment = instance_name.rsplit('-').next().unwrap_or(instance_name);
    let mut hex: String = segment
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .map(|c| c.to_ascii_lowercase())
        .take(32)
        .collect();
    while hex.len() < 32 {
        hex.push('0');
    }
    Uuid::parse_str(&hex).unwrap_or_else(|_| Uuid::nil())
}

/// Finds the restaurant an instance belongs to
///
/// Order: UUID suffix of a known restaurant, then the stored instance name, then
/// the padded fallback id (which may not exist).
pub async fn resolve_restaurant_id(
    restaurants: &RestaurantService,
    instance_name: &str,
) -> Result<Uuid, crate::error::ApiError> {
    if let Some(id) = uuid_suffix(instance_name) {
        if restaurants.find_optional(id).await?.is_some() {
            return Ok(id);
        }
    }

    if let Some(restaurant) = restaurants.find_by_instance_name(instance_name).await? {
        return Ok(restaurant.id);
    }

    let fallback = padded_uuid(instance_name);
    tracing::warn!(
        "No restaurant matches instance {}, falling back to {}",
        instance_name,
        fallback
    );
    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names_are_normalized() {
        assert_eq!(WebhookEvent::parse("MESSAGES_UPSERT"), WebhookEvent::MessagesUpsert);
        assert_eq!(WebhookEvent::parse("messages.upsert"), WebhookEvent::MessagesUpsert);
        assert_eq!(WebhookEvent::parse("CONNECTION_UPDATE"), WebhookEvent::ConnectionUpdate);
        assert_eq!(
            WebhookEvent::parse("QRCODE_UPDATED"),
            WebhookEvent::Other("qrcode.updated".to_string())
        );
    }

    #[test]
    fn test_extracts_plain_text_message() {
        let data = json!({
            "key": {"remoteJid": "5511988887777@s.whatsapp.net", "fromMe": false, "id": "ABC"},
            "pushName": "Maria",
            "message": {"conversation": " Oi, tem pizza? "},
            "messageType": "conversation"
        });
        let incoming = extract_incoming_text(&data).unwrap();
        assert_eq!(incoming.phone, "5511988887777");
        assert_eq!(incoming.text, "Oi, tem pizza?");
        assert_eq!(incoming.push_name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_extracts_extended_text_message() {
        let data = json!({
            "key": {"remoteJid": "5511988887777@s.whatsapp.net"},
            "message": {"extendedTextMessage": {"text": "Quero o cardápio"}}
        });
        assert_eq!(extract_incoming_text(&data).unwrap().text, "Quero o cardápio");
    }

    #[test]
    fn test_ignores_own_group_and_media_messages() {
        let own = json!({
            "key": {"remoteJid": "5511988887777@s.whatsapp.net", "fromMe": true},
            "message": {"conversation": "Olá"}
        });
        assert_eq!(extract_incoming_text(&own), Err("from_me"));

        let group = json!({
            "key": {"remoteJid": "120363025246125486@g.us", "fromMe": false},
            "message": {"conversation": "Olá"}
        });
        assert_eq!(extract_incoming_text(&group), Err("group_message"));

        let image = json!({
            "key": {"remoteJid": "5511988887777@s.whatsapp.net", "fromMe": false},
            "message": {"imageMessage": {"url": "https://example.com/a.jpg"}}
        });
        assert_eq!(extract_incoming_text(&image), Err("unsupported_message_type"));

        assert_eq!(extract_incoming_text(&json!({})), Err("malformed_message"));
    }

    #[test]
    fn test_uuid_suffix() {
        let id = Uuid::new_v4();
        assert_eq!(uuid_suffix(&format!("restaurant-{}", id)), Some(id));
        assert_eq!(uuid_suffix("restaurant-1"), None);
        assert_eq!(uuid_suffix("minha-pizzaria-centro-loja-numero-um"), None);
    }

    #[test]
    fn test_padded_uuid_is_deterministic() {
        let a = padded_uuid("restaurant-abc123");
        assert_eq!(a, padded_uuid("restaurant-abc123"));
        assert_eq!(a.to_string(), "abc12300-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_padded_uuid_truncates_long_segments() {
        let id = padded_uuid("loja-0123456789abcdef0123456789abcdefffff");
        assert_eq!(id.to_string(), "01234567-89ab-cdef-0123-456789abcdef");
    }

    #[test]
    fn test_padded_uuid_without_hex_is_nil() {
        assert_eq!(padded_uuid("pizzaria-xyz"), Uuid::nil());
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(WebhookResponse::ok()).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(WebhookResponse::ignored("from_me")).unwrap(),
            json!({"success": true, "ignored": "from_me"})
        );
        assert_eq!(
            serde_json::to_value(WebhookResponse::failed("boom")).unwrap(),
            json!({"success": false, "error": "boom"})
        );
    }
}
