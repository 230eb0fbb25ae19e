//! Broadcast event bus for distributing events to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`, the `EventBus` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a no-op,
//! and a subscriber only sees events published after it subscribed.

use tokio::sync::broadcast;

/// Multi-consumer event bus.
///
/// Cloning the bus clones the sender, so producers and consumers can be
/// handed out independently. Events are delivered to each subscriber in the
/// order they were published.
pub struct EventBus<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: E) {
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderline_types::event::SessionEvent;

    fn qr(challenge: &str) -> SessionEvent {
        SessionEvent::Qr {
            challenge: challenge.to_string(),
        }
    }

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(qr("first"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received, qr("first"));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_events_in_order() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(qr("a"));
        bus.publish(qr("b"));

        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(rx.recv().await.unwrap(), qr("a"));
            assert_eq!(rx.recv().await.unwrap(), qr("b"));
        }
    }

    #[tokio::test]
    async fn late_subscriber_sees_no_backlog() {
        let bus = EventBus::new(16);
        bus.publish(qr("missed"));

        let mut rx = bus.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.publish(qr("nobody"));
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn clone_shares_channel() {
        let bus = EventBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.publish(qr("via clone"));

        assert_eq!(rx.try_recv().unwrap(), qr("via clone"));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus: EventBus<SessionEvent> = EventBus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(qr("x"));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn debug_impl() {
        let bus: EventBus<SessionEvent> = EventBus::new(16);
        let _rx = bus.subscribe();
        let debug = format!("{bus:?}");
        assert!(debug.contains("EventBus"));
        assert!(debug.contains("receiver_count"));
    }
}
