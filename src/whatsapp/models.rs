use serde::{Deserialize, Serialize};

/// Events the gateway is asked to deliver to our webhook
pub const WEBHOOK_EVENTS: [&str; 2] = ["MESSAGES_UPSERT", "CONNECTION_UPDATE"];

/// Instance names are derived from the restaurant id
pub fn instance_name_for(restaurant_id: uuid::Uuid) -> String {
    format!("restaurant-{}", restaurant_id)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest<'a> {
    pub instance_name: &'a str,
    pub qrcode: bool,
    pub integration: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub instance_name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of POST /instance/create
///
/// Gateway versions disagree on `hash`: either the token itself or `{"apikey": token}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstanceResponse {
    pub instance: InstanceInfo,
    #[serde(default)]
    pub hash: Option<serde_json::Value>,
    #[serde(default)]
    pub qrcode: Option<QrCode>,
}

impl CreateInstanceResponse {
    pub fn instance_token(&self) -> Option<String> {
        match self.hash.as_ref()? {
            serde_json::Value::String(token) => Some(token.clone()),
            serde_json::Value::Object(map) => map
                .get("apikey")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}

/// QR code payload of GET /instance/connect/{name}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    #[serde(default)]
    pub pairing_code: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub base64: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceState {
    #[serde(default)]
    pub instance_name: Option<String>,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionStateResponse {
    pub instance: InstanceState,
}

#[derive(Debug, Serialize)]
pub struct SendTextRequest<'a> {
    pub number: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSettings<'a> {
    pub enabled: bool,
    pub url: &'a str,
    pub webhook_by_events: bool,
    pub webhook_base64: bool,
    pub events: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct SetWebhookRequest<'a> {
    pub webhook: WebhookSettings<'a>,
}

/// Result of creating an instance for a restaurant
#[derive(Debug, Clone, Serialize)]
pub struct CreatedInstance {
    pub instance_name: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub qrcode: Option<QrCode>,
}

/// Body returned by the restaurant WhatsApp endpoints
#[derive(Debug, Clone, Serialize)]
pub struct WhatsAppStatus {
    pub instance_name: String,
    pub state: String,
    pub connected: bool,
}
