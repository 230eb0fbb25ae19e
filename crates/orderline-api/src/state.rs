//! Application state wiring the session, relay and order service together.
//!
//! There is exactly one [`MessagingSession`] per process. It is built here
//! and handed to the order service and HTTP handlers; nothing reaches it
//! through globals.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use orderline_core::event::EventBus;
use orderline_core::messaging::{BoxMessagingBackend, MessagingSession};
use orderline_core::order::{OrderFormatter, OrderService};
use orderline_core::relay::{QrRelay, QrRenderer};
use orderline_infra::bridge::WebBridgeBackend;
use orderline_infra::bridge::store::SessionRecordStore;
use orderline_infra::filesystem::session_dir;
use orderline_infra::qr::SvgQrRenderer;
use orderline_types::config::AppConfig;
use orderline_types::event::RelayEvent;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<MessagingSession>,
    pub orders: Arc<OrderService>,
    /// Frames for real-time subscribers (QR, ready, auth failure, disconnect).
    pub relay_bus: EventBus<RelayEvent>,
    pub config: Arc<AppConfig>,
    cancel: CancellationToken,
}

impl AppState {
    /// Build state backed by the WhatsApp Web bridge.
    pub async fn init(config: AppConfig, data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let store = SessionRecordStore::new(session_dir(data_dir));
        let backend = WebBridgeBackend::new(&config.bridge, store)?;
        tracing::debug!(
            bridge = %config.bridge.api_url,
            client_id = %config.bridge.client_id,
            "Bridge backend configured"
        );

        Ok(Self::with_backend(
            BoxMessagingBackend::new(backend),
            Box::new(SvgQrRenderer::default()),
            config,
        ))
    }

    /// Build state around any backend. The QR relay starts immediately;
    /// the session itself starts on [`AppState::start`].
    pub fn with_backend(
        backend: BoxMessagingBackend,
        renderer: Box<dyn QrRenderer>,
        config: AppConfig,
    ) -> Self {
        let session = Arc::new(MessagingSession::new(backend, config.events.capacity));
        let relay_bus = EventBus::new(config.events.capacity);
        let cancel = CancellationToken::new();

        // Subscribe before the session starts so the first QR is relayed.
        let relay = QrRelay::new(renderer, relay_bus.clone());
        tokio::spawn(relay.run(session.subscribe(), cancel.child_token()));

        let orders = Arc::new(OrderService::new(
            Arc::clone(&session),
            OrderFormatter::new(&config.order),
        ));

        Self {
            session,
            orders,
            relay_bus,
            config: Arc::new(config),
            cancel,
        }
    }

    /// Begin session initialization in the background.
    pub fn start(&self) {
        self.session.start();
    }

    /// Stop the relay, the session forwarder and the backend watcher.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.session.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use orderline_core::messaging::MessagingBackend;
    use orderline_types::error::{MessagingError, QrError};
    use orderline_types::event::SessionEvent;
    use orderline_types::session::SessionInfo;

    use super::*;

    /// Backend that emits a fixed script on initialize and records sends.
    #[derive(Clone, Default)]
    pub struct FakeBackend {
        pub script: Vec<SessionEvent>,
        pub sent: Arc<Mutex<Vec<(String, String)>>>,
        pub fail_with: Option<String>,
    }

    impl FakeBackend {
        pub fn ready() -> Self {
            Self {
                script: vec![SessionEvent::Ready {
                    info: SessionInfo {
                        wid: Some("919800000000@s.whatsapp.net".to_string()),
                        pushname: Some("Pizza Store".to_string()),
                        platform: None,
                    },
                }],
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MessagingBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn initialize(&self, events: EventBus<SessionEvent>) -> Result<(), MessagingError> {
            for event in &self.script {
                events.publish(event.clone());
            }
            Ok(())
        }

        async fn send_text(&self, recipient: &str, body: &str) -> Result<String, MessagingError> {
            if let Some(reason) = &self.fail_with {
                return Err(MessagingError::Delivery(reason.clone()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), body.to_string()));
            Ok("MSG-1".to_string())
        }
    }

    pub struct PlainRenderer;

    impl QrRenderer for PlainRenderer {
        fn render(&self, challenge: &str) -> Result<String, QrError> {
            Ok(format!("data:text/plain,{challenge}"))
        }
    }

    /// Start state around `backend` and wait until its script has been
    /// applied to the session.
    pub async fn started(backend: FakeBackend) -> AppState {
        let expected = backend.script.len();
        let state = AppState::with_backend(
            BoxMessagingBackend::new(backend),
            Box::new(PlainRenderer),
            AppConfig::default(),
        );
        let mut rx = state.session.subscribe();
        state.start();
        for _ in 0..expected {
            rx.recv().await.unwrap();
        }
        state
    }
}
