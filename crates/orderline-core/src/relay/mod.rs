//! QR relay: turns session lifecycle events into real-time frames.
//!
//! On a `Qr` event the challenge is rendered to an image once and the
//! resulting [`RelayEvent`] is broadcast to every current subscriber. There
//! is no replay: a subscriber that connects later waits for the next event.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use orderline_types::error::QrError;
use orderline_types::event::{RelayEvent, SessionEvent};
use orderline_types::session::QrChallenge;

use crate::event::EventBus;

/// Renders a login challenge to an image-embeddable string (a `data:` URL).
pub trait QrRenderer: Send + Sync {
    fn render(&self, challenge: &str) -> Result<String, QrError>;
}

pub struct QrRelay {
    renderer: Box<dyn QrRenderer>,
    bus: EventBus<RelayEvent>,
}

impl QrRelay {
    pub fn new(renderer: Box<dyn QrRenderer>, bus: EventBus<RelayEvent>) -> Self {
        Self { renderer, bus }
    }

    /// Map one session event to its real-time frame.
    ///
    /// A rendering failure still relays the challenge, with `image: None`.
    pub fn relay_event(&self, event: &SessionEvent) -> RelayEvent {
        match event {
            SessionEvent::Qr { challenge } => {
                let image = match self.renderer.render(challenge) {
                    Ok(image) => Some(image),
                    Err(err) => {
                        tracing::warn!(error = %err, "QR render failed; relaying challenge only");
                        None
                    }
                };
                RelayEvent::Qr(QrChallenge {
                    challenge: challenge.clone(),
                    image,
                })
            }
            SessionEvent::Ready { .. } => RelayEvent::Ready,
            SessionEvent::AuthFailure { reason } => RelayEvent::AuthFailure {
                reason: reason.clone(),
            },
            SessionEvent::Disconnected { reason } => RelayEvent::Disconnected {
                reason: reason.clone(),
            },
        }
    }

    /// Relay events until cancelled or the session bus closes.
    pub async fn run(self, mut rx: broadcast::Receiver<SessionEvent>, cancel: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "QR relay lagged, skipping {n} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let frame = self.relay_event(&event);
            tracing::debug!(
                event = event.kind(),
                subscribers = self.bus.receiver_count(),
                "Relaying session event"
            );
            self.bus.publish(frame);
        }

        tracing::debug!("QR relay stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PrefixRenderer;

    impl QrRenderer for PrefixRenderer {
        fn render(&self, challenge: &str) -> Result<String, QrError> {
            Ok(format!("data:text/plain,{challenge}"))
        }
    }

    struct BrokenRenderer;

    impl QrRenderer for BrokenRenderer {
        fn render(&self, _challenge: &str) -> Result<String, QrError> {
            Err(QrError::Encode("data too long".to_string()))
        }
    }

    #[test]
    fn qr_event_carries_rendered_image() {
        let relay = QrRelay::new(Box::new(PrefixRenderer), EventBus::new(4));
        let frame = relay.relay_event(&SessionEvent::Qr {
            challenge: "2@abc".to_string(),
        });
        assert_eq!(
            frame,
            RelayEvent::Qr(QrChallenge {
                challenge: "2@abc".to_string(),
                image: Some("data:text/plain,2@abc".to_string()),
            })
        );
    }

    #[test]
    fn render_failure_still_relays_challenge() {
        let relay = QrRelay::new(Box::new(BrokenRenderer), EventBus::new(4));
        let frame = relay.relay_event(&SessionEvent::Qr {
            challenge: "2@abc".to_string(),
        });
        assert_eq!(
            frame,
            RelayEvent::Qr(QrChallenge {
                challenge: "2@abc".to_string(),
                image: None,
            })
        );
    }

    #[tokio::test]
    async fn run_broadcasts_in_emission_order() {
        let session_bus = EventBus::new(8);
        let relay_bus = EventBus::new(8);
        let mut sub_a = relay_bus.subscribe();
        let mut sub_b = relay_bus.subscribe();
        let cancel = CancellationToken::new();

        let relay = QrRelay::new(Box::new(PrefixRenderer), relay_bus.clone());
        let handle = tokio::spawn(relay.run(session_bus.subscribe(), cancel.clone()));

        session_bus.publish(SessionEvent::Qr {
            challenge: "one".to_string(),
        });
        session_bus.publish(SessionEvent::Ready {
            info: Default::default(),
        });
        session_bus.publish(SessionEvent::Disconnected {
            reason: "LOGOUT".to_string(),
        });

        for sub in [&mut sub_a, &mut sub_b] {
            assert!(matches!(sub.recv().await.unwrap(), RelayEvent::Qr(_)));
            assert_eq!(sub.recv().await.unwrap(), RelayEvent::Ready);
            assert_eq!(
                sub.recv().await.unwrap(),
                RelayEvent::Disconnected {
                    reason: "LOGOUT".to_string()
                }
            );
        }

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn late_subscriber_gets_no_past_qr() {
        let session_bus = EventBus::new(8);
        let relay_bus = EventBus::new(8);
        let mut early = relay_bus.subscribe();
        let cancel = CancellationToken::new();
        let relay = QrRelay::new(Box::new(PrefixRenderer), relay_bus.clone());
        let handle = tokio::spawn(relay.run(session_bus.subscribe(), cancel.clone()));

        session_bus.publish(SessionEvent::Qr {
            challenge: "old".to_string(),
        });
        early.recv().await.unwrap();

        let mut late = relay_bus.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        cancel.cancel();
        handle.await.unwrap();
    }
}
