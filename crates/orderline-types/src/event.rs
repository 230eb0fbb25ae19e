//! Event types for the session and relay event buses.
//!
//! `SessionEvent` is what a messaging backend emits. `RelayEvent` is the
//! server-to-client frame pushed over the real-time channel; it differs only
//! in carrying the rendered QR image. Both are Clone + Send + Sync for use
//! with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::session::{QrChallenge, SessionInfo};

/// Lifecycle events emitted by a messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A login challenge needs to be scanned.
    Qr { challenge: String },
    /// The session is authenticated and can send.
    Ready { info: SessionInfo },
    /// The backend rejected authentication.
    AuthFailure { reason: String },
    /// The session dropped.
    Disconnected { reason: String },
}

impl SessionEvent {
    /// Short event name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Qr { .. } => "qr",
            SessionEvent::Ready { .. } => "ready",
            SessionEvent::AuthFailure { .. } => "auth_failure",
            SessionEvent::Disconnected { .. } => "disconnected",
        }
    }
}

/// Frames pushed to real-time subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    Qr(QrChallenge),
    Ready,
    AuthFailure {
        reason: String,
    },
    Disconnected {
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relay_events_use_snake_case_type_tag() {
        let qr = RelayEvent::Qr(QrChallenge {
            challenge: "2@abc".to_string(),
            image: Some("data:image/svg+xml;base64,AAAA".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&qr).unwrap(),
            json!({"type": "qr", "challenge": "2@abc", "image": "data:image/svg+xml;base64,AAAA"})
        );
        assert_eq!(
            serde_json::to_value(RelayEvent::Ready).unwrap(),
            json!({"type": "ready"})
        );
        assert_eq!(
            serde_json::to_value(RelayEvent::AuthFailure {
                reason: "logged out".to_string()
            })
            .unwrap(),
            json!({"type": "auth_failure", "reason": "logged out"})
        );
        assert_eq!(
            serde_json::to_value(RelayEvent::Disconnected {
                reason: "close".to_string()
            })
            .unwrap(),
            json!({"type": "disconnected", "reason": "close"})
        );
    }

    #[test]
    fn session_event_kind() {
        let event = SessionEvent::Ready {
            info: SessionInfo::default(),
        };
        assert_eq!(event.kind(), "ready");
        assert_eq!(
            SessionEvent::Qr {
                challenge: String::new()
            }
            .kind(),
            "qr"
        );
    }
}
