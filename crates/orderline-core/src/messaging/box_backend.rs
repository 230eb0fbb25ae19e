//! BoxMessagingBackend -- object-safe dynamic dispatch wrapper for MessagingBackend.
//!
//! 1. Define an object-safe `MessagingBackendDyn` trait with boxed futures
//! 2. Blanket-impl `MessagingBackendDyn` for all `T: MessagingBackend`
//! 3. `BoxMessagingBackend` wraps `Box<dyn MessagingBackendDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use orderline_types::error::MessagingError;
use orderline_types::event::SessionEvent;

use super::backend::MessagingBackend;
use crate::event::EventBus;

/// Object-safe version of [`MessagingBackend`] with boxed futures.
pub trait MessagingBackendDyn: Send + Sync {
    fn name(&self) -> &str;

    fn initialize_boxed(
        &self,
        events: EventBus<SessionEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<(), MessagingError>> + Send + '_>>;

    fn recipient_for(&self, phone_digits: &str) -> String;

    fn send_text_boxed<'a>(
        &'a self,
        recipient: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, MessagingError>> + Send + 'a>>;

    fn shutdown(&self);
}

impl<T: MessagingBackend> MessagingBackendDyn for T {
    fn name(&self) -> &str {
        MessagingBackend::name(self)
    }

    fn initialize_boxed(
        &self,
        events: EventBus<SessionEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<(), MessagingError>> + Send + '_>> {
        Box::pin(self.initialize(events))
    }

    fn recipient_for(&self, phone_digits: &str) -> String {
        MessagingBackend::recipient_for(self, phone_digits)
    }

    fn send_text_boxed<'a>(
        &'a self,
        recipient: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, MessagingError>> + Send + 'a>> {
        Box::pin(self.send_text(recipient, body))
    }

    fn shutdown(&self) {
        MessagingBackend::shutdown(self)
    }
}

/// Type-erased messaging backend.
///
/// Since `MessagingBackend` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxMessagingBackend` exposes the same operations through the
/// inner `MessagingBackendDyn` trait object.
pub struct BoxMessagingBackend {
    inner: Box<dyn MessagingBackendDyn>,
}

impl BoxMessagingBackend {
    /// Wrap a concrete `MessagingBackend` in a type-erased box.
    pub fn new<T: MessagingBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn initialize(&self, events: EventBus<SessionEvent>) -> Result<(), MessagingError> {
        self.inner.initialize_boxed(events).await
    }

    pub fn recipient_for(&self, phone_digits: &str) -> String {
        self.inner.recipient_for(phone_digits)
    }

    pub async fn send_text(&self, recipient: &str, body: &str) -> Result<String, MessagingError> {
        self.inner.send_text_boxed(recipient, body).await
    }

    pub fn shutdown(&self) {
        self.inner.shutdown()
    }
}

impl std::fmt::Debug for BoxMessagingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxMessagingBackend")
            .field("name", &self.inner.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBackend;

    impl MessagingBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn initialize(&self, events: EventBus<SessionEvent>) -> Result<(), MessagingError> {
            events.publish(SessionEvent::Qr {
                challenge: "echo-qr".to_string(),
            });
            Ok(())
        }

        async fn send_text(&self, recipient: &str, body: &str) -> Result<String, MessagingError> {
            Ok(format!("{recipient}:{}", body.len()))
        }
    }

    #[tokio::test]
    async fn boxed_backend_delegates_all_operations() {
        let backend = BoxMessagingBackend::new(EchoBackend);
        assert_eq!(backend.name(), "echo");
        assert_eq!(backend.recipient_for("123"), "123@c.us");

        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        backend.initialize(bus).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::Qr {
                challenge: "echo-qr".to_string()
            }
        );

        let id = backend.send_text("123@c.us", "hello").await.unwrap();
        assert_eq!(id, "123@c.us:5");
        backend.shutdown();
    }

    #[test]
    fn debug_shows_name() {
        let backend = BoxMessagingBackend::new(EchoBackend);
        assert!(format!("{backend:?}").contains("echo"));
    }
}
