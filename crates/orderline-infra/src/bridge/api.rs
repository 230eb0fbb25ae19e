//! HTTP client for the WhatsApp Web bridge.
//!
//! Every request carries an `apikey` header. Instance-scoped calls use the
//! per-instance token when the bridge issued one, otherwise the global key.
//! Neither key is ever logged.

use std::sync::RwLock;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use orderline_types::config::BridgeConfig;
use orderline_types::error::MessagingError;
use orderline_types::session::SessionInfo;

use super::types::{
    ConnectionState, error_reason, extract_connection_state, extract_instance_token,
    extract_message_id, extract_qr_code, extract_session_info, is_missing_instance,
};

/// Result of `POST /instance/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created {
        instance_token: Option<String>,
        challenge: Option<String>,
    },
    /// An instance with this name already exists on the bridge.
    AlreadyExists,
}

pub struct BridgeApi {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    instance: String,
    instance_token: RwLock<Option<SecretString>>,
}

impl BridgeApi {
    pub fn new(config: &BridgeConfig) -> Result<Self, MessagingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| MessagingError::Backend(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(config.api_key.expose_secret().to_string()),
            instance: config.client_id.clone(),
            instance_token: RwLock::new(None),
        })
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn set_instance_token(&self, token: Option<String>) {
        let mut guard = self
            .instance_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = token.map(SecretString::from);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn global_key(&self) -> String {
        self.api_key.expose_secret().to_string()
    }

    fn instance_key(&self) -> String {
        let guard = self
            .instance_token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(token) => token.expose_secret().to_string(),
            None => self.global_key(),
        }
    }

    /// Create the instance named after the client id.
    pub async fn create_instance(&self) -> Result<CreateOutcome, MessagingError> {
        let body = json!({
            "instanceName": self.instance,
            "qrcode": true,
            "integration": "WHATSAPP-BAILEYS",
        });

        let response = self
            .client
            .post(self.url("/instance/create"))
            .header("apikey", self.global_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError::Backend(format!("bridge unreachable: {e}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let lower = text.to_lowercase();
            if (status.as_u16() == 403 || status.as_u16() == 409)
                && (lower.contains("already in use") || lower.contains("already exists"))
            {
                return Ok(CreateOutcome::AlreadyExists);
            }
            return Err(MessagingError::Backend(error_reason(status.as_u16(), &text)));
        }

        let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(CreateOutcome::Created {
            instance_token: extract_instance_token(&parsed),
            challenge: extract_qr_code(&parsed),
        })
    }

    /// Ask the bridge for a fresh login challenge.
    pub async fn connect(&self) -> Result<Option<String>, MessagingError> {
        let path = format!("/instance/connect/{}", self.instance);
        let (status, text) = self.get(&path, &[]).await?;
        Ok(extract_qr_code(&json_body(status, &text)?))
    }

    /// Current connection state, or `None` when the bridge has no instance
    /// by this name.
    pub async fn connection_state(&self) -> Result<Option<ConnectionState>, MessagingError> {
        let path = format!("/instance/connectionState/{}", self.instance);
        let (status, text) = self.get(&path, &[]).await?;
        if is_missing_instance(status, &text) {
            return Ok(None);
        }
        extract_connection_state(&json_body(status, &text)?)
            .map(Some)
            .ok_or_else(|| MessagingError::Backend("connection state missing from response".into()))
    }

    /// Account details of the linked phone.
    pub async fn fetch_info(&self) -> Result<SessionInfo, MessagingError> {
        let (status, text) = self
            .get("/instance/fetchInstances", &[("instanceName", self.instance.as_str())])
            .await?;
        Ok(extract_session_info(&json_body(status, &text)?))
    }

    /// Send a text message, returning the bridge-assigned message id.
    pub async fn send_text(&self, number: &str, text: &str) -> Result<String, MessagingError> {
        let body = json!({ "number": number, "text": text });

        let response = self
            .client
            .post(self.url(&format!("/message/sendText/{}", self.instance)))
            .header("apikey", self.instance_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError::Delivery(format!("bridge unreachable: {e}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MessagingError::Delivery(error_reason(status.as_u16(), &text)));
        }

        let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(extract_message_id(&parsed).unwrap_or_default())
    }

    /// Instance-scoped GET returning the raw status and body.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<(u16, String), MessagingError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .header("apikey", self.instance_key())
            .send()
            .await
            .map_err(|e| MessagingError::Backend(format!("bridge unreachable: {e}")))?;

        let status = response.status().as_u16();
        Ok((status, response.text().await.unwrap_or_default()))
    }
}

fn json_body(status: u16, text: &str) -> Result<Value, MessagingError> {
    if !(200..300).contains(&status) {
        return Err(MessagingError::Backend(error_reason(status, text)));
    }
    serde_json::from_str(text)
        .map_err(|e| MessagingError::Backend(format!("invalid bridge response: {e}")))
}

impl std::fmt::Debug for BridgeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeApi")
            .field("base_url", &self.base_url)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}
