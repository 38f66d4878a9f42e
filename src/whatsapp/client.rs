use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::EvolutionConfig;
use crate::whatsapp::{
    ConnectionStateResponse, CreateInstanceRequest, CreateInstanceResponse, CreatedInstance,
    EvolutionError, QrCode, SendTextRequest, SetWebhookRequest, WebhookSettings, WEBHOOK_EVENTS,
};

/// Outbound WhatsApp messaging
///
/// Services depend on this instead of the concrete client so tests can record sends.
#[async_trait]
pub trait WhatsAppGateway: Send + Sync {
    async fn send_text(&self, instance_name: &str, number: &str, text: &str) -> Result<(), EvolutionError>;
}

/// HTTP client for the Evolution API WhatsApp gateway
#[derive(Clone)]
pub struct EvolutionApiClient {
    client: reqwest::Client,
    base_url: String,
    webhook_url: Option<String>,
}

impl EvolutionApiClient {
    pub fn new(config: &EvolutionConfig, timeout: Duration) -> Result<Self, EvolutionError> {
        let mut headers = HeaderMap::new();
        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| EvolutionError::InvalidApiKey)?;
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            webhook_url: config
                .webhook_base_url
                .as_ref()
                .map(|base| format!("{}/api/ai/webhook", base)),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, EvolutionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvolutionError::Status { status, body });
        }
        Ok(response.json::<T>().await?)
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), EvolutionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvolutionError::Status { status, body });
        }
        Ok(())
    }

    /// Creates the instance, then points its webhook at this service when a public URL is configured
    pub async fn create_instance(&self, instance_name: &str) -> Result<CreatedInstance, EvolutionError> {
        info!("Creating WhatsApp instance {}", instance_name);
        let response = self
            .client
            .post(self.endpoint("instance/create"))
            .json(&CreateInstanceRequest {
                instance_name,
                qrcode: true,
                integration: "WHATSAPP-BAILEYS",
            })
            .send()
            .await?;
        let created: CreateInstanceResponse = Self::parse(response).await?;

        if let Some(webhook_url) = self.webhook_url.as_deref() {
            if let Err(e) = self.set_webhook(instance_name, webhook_url).await {
                warn!("Webhook setup for instance {} failed: {}", instance_name, e);
            }
        }

        Ok(CreatedInstance {
            token: created.instance_token(),
            instance_name: created.instance.instance_name,
            qrcode: created.qrcode,
        })
    }

    async fn fetch_connect(&self, instance_name: &str) -> Result<QrCode, EvolutionError> {
        let response = self
            .client
            .get(self.endpoint(&format!("instance/connect/{}", instance_name)))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Starts a session; an unknown instance is created first and the request retried once
    pub async fn connect_instance(&self, instance_name: &str) -> Result<QrCode, EvolutionError> {
        match self.fetch_connect(instance_name).await {
            Err(e) if e.is_not_found() => {
                info!("Instance {} not found on gateway, creating it", instance_name);
                self.create_instance(instance_name).await?;
                self.fetch_connect(instance_name).await
            }
            other => other,
        }
    }

    /// Current pairing QR code of the instance
    pub async fn get_qr_code(&self, instance_name: &str) -> Result<QrCode, EvolutionError> {
        let qr = self.connect_instance(instance_name).await?;
        if qr.base64.is_none() && qr.code.is_none() {
            debug!("Instance {} returned no QR code, probably already paired", instance_name);
        }
        Ok(qr)
    }

    /// Raw gateway state, `open` when the phone is paired
    pub async fn connection_state(&self, instance_name: &str) -> Result<String, EvolutionError> {
        let response = self
            .client
            .get(self.endpoint(&format!("instance/connectionState/{}", instance_name)))
            .send()
            .await?;
        let state: ConnectionStateResponse = Self::parse(response).await?;
        Ok(state.instance.state)
    }

    pub async fn logout_instance(&self, instance_name: &str) -> Result<(), EvolutionError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("instance/logout/{}", instance_name)))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    pub async fn delete_instance(&self, instance_name: &str) -> Result<(), EvolutionError> {
        info!("Deleting WhatsApp instance {}", instance_name);
        let response = self
            .client
            .delete(self.endpoint(&format!("instance/delete/{}", instance_name)))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    pub async fn set_webhook(&self, instance_name: &str, url: &str) -> Result<(), EvolutionError> {
        debug!("Setting webhook of {} to {}", instance_name, url);
        let response = self
            .client
            .post(self.endpoint(&format!("webhook/set/{}", instance_name)))
            .json(&SetWebhookRequest {
                webhook: WebhookSettings {
                    enabled: true,
                    url,
                    webhook_by_events: false,
                    webhook_base64: false,
                    events: &WEBHOOK_EVENTS,
                },
            })
            .send()
            .await?;
        Self::expect_success(response).await
    }
}

#[async_trait]
impl WhatsAppGateway for EvolutionApiClient {
    async fn send_text(&self, instance_name: &str, number: &str, text: &str) -> Result<(), EvolutionError> {
        let response = self
            .client
            .post(self.endpoint(&format!("message/sendText/{}", instance_name)))
            .json(&SendTextRequest { number, text })
            .send()
            .await?;
        Self::expect_success(response).await?;
        info!("Sent WhatsApp message via {} to {}", instance_name, number);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMessage {
        pub instance: String,
        pub number: String,
        pub text: String,
    }

    /// Gateway that records messages instead of sending them
    #[derive(Default)]
    pub struct RecordingGateway {
        pub sent: Mutex<Vec<SentMessage>>,
        pub fail: bool,
    }

    impl RecordingGateway {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn messages(&self) -> Vec<SentMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WhatsAppGateway for RecordingGateway {
        async fn send_text(&self, instance_name: &str, number: &str, text: &str) -> Result<(), EvolutionError> {
            if self.fail {
                return Err(EvolutionError::Status {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    body: "gateway down".to_string(),
                });
            }
            self.sent.lock().unwrap().push(SentMessage {
                instance: instance_name.to_string(),
                number: number.to_string(),
                text: text.to_string(),
            });
            Ok(())
        }
    }
}
