//! Response parsing for the WhatsApp Web bridge HTTP API.
//!
//! The bridge (Evolution API compatible) has shipped several response shapes
//! across versions; every helper here accepts all of the ones seen in the
//! wild and returns `None` rather than failing on anything unexpected.

use serde_json::Value;

use orderline_types::session::SessionInfo;

/// Connection state reported by `GET /instance/connectionState/{instance}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Connecting,
    Close,
    /// The phone rejected or revoked the link.
    Refused,
    Unknown(String),
}

impl ConnectionState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "open" | "connected" => ConnectionState::Open,
            "connecting" => ConnectionState::Connecting,
            "close" | "closed" => ConnectionState::Close,
            "refused" => ConnectionState::Refused,
            other => ConnectionState::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConnectionState::Open => "open",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Close => "close",
            ConnectionState::Refused => "refused",
            ConnectionState::Unknown(raw) => raw,
        }
    }
}

/// `{ "instance": { "state": "open" } }` or `{ "state": "open" }`.
pub fn extract_connection_state(resp: &Value) -> Option<ConnectionState> {
    resp["instance"]["state"]
        .as_str()
        .or_else(|| resp["state"].as_str())
        .map(ConnectionState::parse)
}

/// The raw challenge string from a create or connect response.
///
/// - connect: `{ "code": "2@...", "base64": "data:image/..." }`
/// - create:  `{ "qrcode": { "code": "2@...", "base64": "..." } }`
pub fn extract_qr_code(resp: &Value) -> Option<String> {
    resp["code"]
        .as_str()
        .or_else(|| resp["qrcode"]["code"].as_str())
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

/// Per-instance token from a create response: `{ "hash": { "apikey": "..." } }`
/// or `{ "hash": "..." }`.
pub fn extract_instance_token(resp: &Value) -> Option<String> {
    resp["hash"]["apikey"]
        .as_str()
        .or_else(|| resp["hash"].as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Account details from `GET /instance/fetchInstances?instanceName=`.
///
/// Accepts an array or a single object, in either the flat
/// (`ownerJid`, `profileName`) or nested (`instance.owner`) layout.
pub fn extract_session_info(resp: &Value) -> SessionInfo {
    static NULL: Value = Value::Null;

    let entry = match resp {
        Value::Array(entries) => entries.first().unwrap_or(&NULL),
        other => other,
    };
    let inner = if entry["instance"].is_object() {
        &entry["instance"]
    } else {
        entry
    };

    SessionInfo {
        wid: first_text(inner, &["ownerJid", "owner"]),
        pushname: first_text(inner, &["profileName"]),
        platform: first_text(inner, &["integration", "platform"]),
    }
}

fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value[*k].as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Message id from a send response: `{ "key": { "id": "BAE5..." } }`.
pub fn extract_message_id(resp: &Value) -> Option<String> {
    resp["key"]["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Human-readable failure reason from an error response body.
///
/// Understands `{ "response": { "message": [...] } }` including the
/// `{ "exists": false, "number": "..." }` entries the bridge returns for
/// numbers that are not on WhatsApp. Falls back to the raw body, truncated.
pub fn error_reason(status: u16, body: &str) -> String {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = &parsed["response"]["message"];

    let parts: Vec<String> = match message {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) if entry["exists"] == Value::Bool(false) => Some(format!(
                    "{} is not on WhatsApp",
                    entry["number"]
                        .as_str()
                        .or_else(|| entry["jid"].as_str())
                        .unwrap_or("recipient")
                )),
                Value::Object(_) => Some(entry.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    };

    if !parts.is_empty() {
        return parts.join("; ");
    }
    if let Some(err) = parsed["error"].as_str() {
        return format!("{err} ({status})");
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("bridge returned {status}")
    } else {
        let snippet: String = trimmed.chars().take(300).collect();
        format!("bridge returned {status}: {snippet}")
    }
}

/// Whether an instance-scoped response means the instance is gone.
pub fn is_missing_instance(status: u16, body: &str) -> bool {
    status == 404 || (status >= 400 && body.contains("does not exist"))
}
