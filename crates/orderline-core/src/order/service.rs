//! OrderService -- submits orders through the messaging session.
//!
//! Submission order is fixed: readiness, payload validation, phone
//! normalization, formatting, send. A submission either fully sends or
//! fails with one [`SubmitError`]; nothing is queued or retried.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use orderline_types::error::SubmitError;
use orderline_types::order::{Order, OutboundMessage};

use super::format::OrderFormatter;
use super::validate::parse_order;
use crate::messaging::MessagingSession;

pub struct OrderService {
    session: Arc<MessagingSession>,
    formatter: OrderFormatter,
}

impl OrderService {
    pub fn new(session: Arc<MessagingSession>, formatter: OrderFormatter) -> Self {
        Self { session, formatter }
    }

    /// Validate, format and send a raw JSON order body.
    ///
    /// Returns the backend message id. The readiness check happens before
    /// the body is even parsed, so a not-ready session never reports
    /// `InvalidPayload` and never reaches the backend.
    pub async fn submit(&self, body: &[u8]) -> Result<String, SubmitError> {
        if !self.session.is_ready() {
            return Err(SubmitError::NotReady);
        }

        let order = parse_order(body).inspect_err(|err| {
            tracing::info!(error = %err, "Rejected order payload");
        })?;

        let message = self.compose(&order, &Local::now());
        tracing::debug!(
            recipient = %message.recipient,
            items = order.items.len(),
            "Submitting order"
        );

        Ok(self.session.send(&message).await?)
    }

    /// Build the outbound message for an order at a given submission time.
    pub fn compose<Tz>(&self, order: &Order, submitted_at: &DateTime<Tz>) -> OutboundMessage
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        OutboundMessage {
            recipient: self.session.recipient_for(&order.phone),
            body: self.formatter.format(order, submitted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::event::EventBus;
    use orderline_types::error::OrderError;
    use crate::messaging::{BoxMessagingBackend, MessagingBackend};
    use orderline_types::error::MessagingError;
    use orderline_types::event::SessionEvent;
    use orderline_types::session::SessionInfo;

    #[derive(Clone, Default)]
    struct RecordingBackend {
        bus: Arc<Mutex<Option<EventBus<SessionEvent>>>>,
        sent: Arc<Mutex<Vec<(String, String)>>>,
        reject_with: Option<String>,
    }

    impl MessagingBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        async fn initialize(&self, events: EventBus<SessionEvent>) -> Result<(), MessagingError> {
            *self.bus.lock().unwrap() = Some(events);
            Ok(())
        }

        async fn send_text(&self, recipient: &str, body: &str) -> Result<String, MessagingError> {
            if let Some(reason) = &self.reject_with {
                return Err(MessagingError::Delivery(reason.clone()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((recipient.to_string(), body.to_string()));
            Ok(format!("msg-{}", sent.len()))
        }
    }

    async fn service(backend: &RecordingBackend, ready: bool) -> OrderService {
        let session = Arc::new(MessagingSession::new(
            BoxMessagingBackend::new(backend.clone()),
            16,
        ));
        let mut rx = session.subscribe();
        session.start();
        while backend.bus.lock().unwrap().is_none() {
            tokio::task::yield_now().await;
        }
        if ready {
            let bus = backend.bus.lock().unwrap().clone().unwrap();
            bus.publish(SessionEvent::Ready {
                info: SessionInfo::default(),
            });
            rx.recv().await.unwrap();
        }
        OrderService::new(session, OrderFormatter::default())
    }

    const MARGHERITA: &[u8] = br#"{"phone":"919876543210","items":[{"name":"Margherita","qty":2,"price":150}],"notes":"less spicy"}"#;

    #[tokio::test]
    async fn ready_session_sends_formatted_order() {
        let backend = RecordingBackend::default();
        let svc = service(&backend, true).await;

        let id = svc.submit(MARGHERITA).await.unwrap();
        assert_eq!(id, "msg-1");

        let sent = backend.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "919876543210@c.us");
        assert!(sent[0].1.contains("1. Margherita  x2 - ₹150"));
        assert!(sent[0].1.contains("₹300"));
        assert!(sent[0].1.contains("less spicy"));
    }

    #[tokio::test]
    async fn not_ready_wins_over_invalid_payload() {
        let backend = RecordingBackend::default();
        let svc = service(&backend, false).await;

        assert_eq!(svc.submit(MARGHERITA).await, Err(SubmitError::NotReady));
        assert_eq!(svc.submit(b"{}").await, Err(SubmitError::NotReady));
        assert!(backend.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_payload_never_sends() {
        let backend = RecordingBackend::default();
        let svc = service(&backend, true).await;

        let err = svc
            .submit(br#"{"phone":"919876543210","items":[]}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(OrderError::InvalidPayload(_))));

        let err = svc.submit(br#"{"items":[{"name":"x"}]}"#).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(_)));
        assert!(backend.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_carries_backend_reason() {
        let backend = RecordingBackend {
            reject_with: Some("recipient not on WhatsApp".to_string()),
            ..Default::default()
        };
        let svc = service(&backend, true).await;

        assert_eq!(
            svc.submit(MARGHERITA).await,
            Err(SubmitError::Delivery("recipient not on WhatsApp".to_string()))
        );
    }
}
