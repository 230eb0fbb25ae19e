//! MessagingBackend trait definition.
//!
//! The real state machine of a chat backend lives inside the backend. This
//! system only sees it through `initialize`, `send_text` and the lifecycle
//! events the backend publishes on the bus it is handed.

use std::future::Future;

use orderline_types::error::MessagingError;
use orderline_types::event::SessionEvent;

use crate::event::EventBus;

/// Trait for chat backends (WhatsApp Web bridge, test fakes).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap an
/// implementation in [`BoxMessagingBackend`](super::BoxMessagingBackend) for
/// dynamic dispatch.
pub trait MessagingBackend: Send + Sync {
    /// Human-readable backend name (e.g., "whatsapp-web-bridge").
    fn name(&self) -> &str;

    /// Begin establishing a session.
    ///
    /// May publish any number of [`SessionEvent`]s on `events`, before and
    /// after returning. Implementations that need to keep watching the
    /// backend spawn their own task.
    fn initialize(
        &self,
        events: EventBus<SessionEvent>,
    ) -> impl Future<Output = Result<(), MessagingError>> + Send;

    /// Backend-specific recipient identifier for a digits-only phone number.
    fn recipient_for(&self, phone_digits: &str) -> String {
        format!("{phone_digits}@c.us")
    }

    /// Submit a text message. Returns the backend-assigned message id.
    fn send_text(
        &self,
        recipient: &str,
        body: &str,
    ) -> impl Future<Output = Result<String, MessagingError>> + Send;

    /// Stop any background work started by `initialize`.
    fn shutdown(&self) {}
}
