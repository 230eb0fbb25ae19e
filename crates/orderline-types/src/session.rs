//! Messaging session state as observed from backend events.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the messaging session.
///
/// Populated purely from observed backend events; never inferred from
/// request traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No event received yet.
    #[default]
    Unauthenticated,
    /// A QR challenge was emitted and is waiting to be scanned.
    AwaitingScan,
    Ready,
    Disconnected,
    AuthFailed,
}

impl SessionState {
    pub fn is_ready(self) -> bool {
        matches!(self, SessionState::Ready)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::AwaitingScan => "awaiting_scan",
            SessionState::Ready => "ready",
            SessionState::Disconnected => "disconnected",
            SessionState::AuthFailed => "auth_failed",
        };
        f.write_str(s)
    }
}

/// Identity of the authenticated account, reported by the backend on ready.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Account identifier on the backend (e.g. `919800000000@s.whatsapp.net`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wid: Option<String>,
    /// Profile display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub ready: bool,
    /// Present only while the session is ready.
    pub info: Option<SessionInfo>,
}

/// A login challenge plus its rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrChallenge {
    pub challenge: String,
    /// `data:` URL of the rendered code, or `None` if rendering failed.
    pub image: Option<String>,
}
