//! MessagingSession -- the single per-process messaging session.
//!
//! Owns the boxed backend and the observed [`SessionState`]. The backend
//! publishes raw lifecycle events on a private bus; a forwarder task applies
//! each one to the state and then republishes it on the public bus, so any
//! subscriber that sees an event can rely on the state already reflecting it.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use orderline_types::error::MessagingError;
use orderline_types::event::SessionEvent;
use orderline_types::order::OutboundMessage;
use orderline_types::session::{SessionInfo, SessionState, SessionStatus};

use super::box_backend::BoxMessagingBackend;
use crate::event::EventBus;

#[derive(Debug, Default)]
struct Snapshot {
    state: SessionState,
    info: Option<SessionInfo>,
}

impl Snapshot {
    fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Qr { .. } => {
                self.state = SessionState::AwaitingScan;
                self.info = None;
            }
            SessionEvent::Ready { info } => {
                self.state = SessionState::Ready;
                self.info = Some(info.clone());
            }
            SessionEvent::AuthFailure { .. } => {
                self.state = SessionState::AuthFailed;
                self.info = None;
            }
            SessionEvent::Disconnected { .. } => {
                self.state = SessionState::Disconnected;
                self.info = None;
            }
        }
    }
}

/// Shared messaging session. Construct once per process and share via `Arc`.
pub struct MessagingSession {
    backend: Arc<BoxMessagingBackend>,
    snapshot: Arc<RwLock<Snapshot>>,
    backend_events: EventBus<SessionEvent>,
    events: EventBus<SessionEvent>,
    cancel: CancellationToken,
}

impl MessagingSession {
    pub fn new(backend: BoxMessagingBackend, event_capacity: usize) -> Self {
        Self {
            backend: Arc::new(backend),
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
            backend_events: EventBus::new(event_capacity),
            events: EventBus::new(event_capacity),
            cancel: CancellationToken::new(),
        }
    }

    /// Start the forwarder and kick off backend initialization.
    ///
    /// Initialization failures are logged and leave the session not ready;
    /// they never propagate.
    pub fn start(&self) -> JoinHandle<()> {
        // Subscribe before initializing so no early event is missed.
        let raw_rx = self.backend_events.subscribe();
        let forwarder = tokio::spawn(forward_events(
            raw_rx,
            self.snapshot.clone(),
            self.events.clone(),
            self.cancel.clone(),
        ));

        let backend = self.backend.clone();
        let raw_bus = self.backend_events.clone();
        tokio::spawn(async move {
            tracing::info!(backend = backend.name(), "Initializing messaging session");
            if let Err(err) = backend.initialize(raw_bus).await {
                tracing::error!(
                    backend = backend.name(),
                    error = %err,
                    "Messaging session initialization failed; staying not ready"
                );
            }
        });

        forwarder
    }

    /// Subscribe to lifecycle events after they have been applied to the state.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.read_snapshot(|s| s.state)
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// `{ready, info}`; `info` is only present while ready.
    pub fn status(&self) -> SessionStatus {
        self.read_snapshot(|s| SessionStatus {
            ready: s.state.is_ready(),
            info: if s.state.is_ready() { s.info.clone() } else { None },
        })
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn recipient_for(&self, phone_digits: &str) -> String {
        self.backend.recipient_for(phone_digits)
    }

    /// Send a text message through the backend.
    ///
    /// Fails with [`MessagingError::NotReady`] without touching the backend
    /// unless the session is ready.
    pub async fn send_text(&self, recipient: &str, body: &str) -> Result<String, MessagingError> {
        let state = self.state();
        if !state.is_ready() {
            tracing::warn!(%state, recipient, "Send rejected: session not ready");
            return Err(MessagingError::NotReady);
        }

        match self.backend.send_text(recipient, body).await {
            Ok(id) => {
                tracing::info!(recipient, message_id = %id, "Message sent");
                Ok(id)
            }
            Err(err) => {
                tracing::error!(recipient, error = %err, "Message send failed");
                Err(err)
            }
        }
    }

    pub async fn send(&self, message: &OutboundMessage) -> Result<String, MessagingError> {
        self.send_text(&message.recipient, &message.body).await
    }

    /// Stop the forwarder and any backend watcher.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.backend.shutdown();
    }

    fn read_snapshot<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let guard = self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }
}

impl std::fmt::Debug for MessagingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingSession")
            .field("backend", &self.backend.name())
            .field("state", &self.state())
            .finish()
    }
}

async fn forward_events(
    mut raw_rx: broadcast::Receiver<SessionEvent>,
    snapshot: Arc<RwLock<Snapshot>>,
    events: EventBus<SessionEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            received = raw_rx.recv() => match received {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Session forwarder lagged, skipping {n} events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        {
            let mut guard = snapshot
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.apply(&event);
            tracing::info!(event = event.kind(), state = %guard.state, "Session event");
        }

        match &event {
            SessionEvent::AuthFailure { reason } => {
                tracing::error!(%reason, "Messaging authentication failed; rescan required");
            }
            SessionEvent::Disconnected { reason } => {
                tracing::warn!(%reason, "Messaging session disconnected");
            }
            _ => {}
        }

        events.publish(event);
    }

    tracing::debug!("Session forwarder stopped");
}
