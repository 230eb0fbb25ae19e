//! WhatsApp Web bridge backend.
//!
//! Drives an Evolution API compatible bridge that owns the headless
//! WhatsApp Web session. The instance is named after the configured client
//! id, so credentials linked once survive restarts of both processes.

pub mod api;
pub mod store;
pub mod types;
pub mod watcher;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use orderline_core::event::EventBus;
use orderline_core::messaging::MessagingBackend;
use orderline_types::config::BridgeConfig;
use orderline_types::error::MessagingError;
use orderline_types::event::SessionEvent;

use self::api::{BridgeApi, CreateOutcome};
use self::store::{SessionRecord, SessionRecordStore};

pub struct WebBridgeBackend {
    api: Arc<BridgeApi>,
    store: SessionRecordStore,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl WebBridgeBackend {
    pub fn new(config: &BridgeConfig, store: SessionRecordStore) -> Result<Self, MessagingError> {
        Ok(Self {
            api: Arc::new(BridgeApi::new(config)?),
            store,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            cancel: CancellationToken::new(),
        })
    }

    /// Reuse the persisted instance, or create one. Returns the login
    /// challenge the bridge handed back on create, if any.
    async fn ensure_instance(&self) -> Result<Option<String>, MessagingError> {
        let client_id = self.api.instance();
        if let Some(record) = load_record(&self.store, client_id).await {
            tracing::info!(instance = client_id, "Reusing bridge instance");
            self.api.set_instance_token(record.instance_token);
            return Ok(None);
        }
        create_instance(&self.api, &self.store).await
    }
}

/// Load the saved record. An unreadable record is discarded, which leads to
/// a fresh instance and a new login QR.
async fn load_record(store: &SessionRecordStore, client_id: &str) -> Option<SessionRecord> {
    match store.load(client_id).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(error = %err, "Discarding unreadable session record");
            forget(store, client_id).await;
            None
        }
    }
}

async fn forget(store: &SessionRecordStore, client_id: &str) {
    if let Err(err) = store.remove(client_id).await {
        tracing::warn!(error = %err, "Failed to remove session record");
    }
}

async fn create_instance(
    api: &BridgeApi,
    store: &SessionRecordStore,
) -> Result<Option<String>, MessagingError> {
    let client_id = api.instance();
    let (token, challenge) = match api.create_instance().await? {
        CreateOutcome::Created {
            instance_token,
            challenge,
        } => {
            tracing::info!(instance = client_id, "Created bridge instance");
            (instance_token, challenge)
        }
        CreateOutcome::AlreadyExists => {
            tracing::info!(instance = client_id, "Bridge instance already exists, adopting it");
            (None, None)
        }
    };

    api.set_instance_token(token.clone());
    if let Err(err) = store.save(&SessionRecord::new(client_id, token)).await {
        tracing::warn!(error = %err, "Failed to save session record");
    }
    Ok(challenge)
}

/// The bridge lost the instance: forget it locally and create it again.
pub(crate) async fn recreate_instance(
    api: &BridgeApi,
    store: &SessionRecordStore,
) -> Result<Option<String>, MessagingError> {
    tracing::warn!(
        instance = api.instance(),
        "Bridge no longer knows the instance, creating it again"
    );
    forget(store, api.instance()).await;
    api.set_instance_token(None);
    create_instance(api, store).await
}

impl MessagingBackend for WebBridgeBackend {
    fn name(&self) -> &str {
        "whatsapp-web-bridge"
    }

    async fn initialize(&self, events: EventBus<SessionEvent>) -> Result<(), MessagingError> {
        let initial_challenge = self.ensure_instance().await?;

        tokio::spawn(watcher::watch(
            Arc::clone(&self.api),
            self.store.clone(),
            events,
            self.poll_interval,
            initial_challenge,
            self.cancel.child_token(),
        ));
        Ok(())
    }

    fn recipient_for(&self, phone_digits: &str) -> String {
        format!("{phone_digits}@s.whatsapp.net")
    }

    async fn send_text(&self, recipient: &str, body: &str) -> Result<String, MessagingError> {
        self.api.send_text(recipient, body).await
    }

    fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for WebBridgeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebBridgeBackend")
            .field("api", &self.api)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend(dir: &std::path::Path) -> WebBridgeBackend {
        let config = BridgeConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 2,
            ..BridgeConfig::default()
        };
        WebBridgeBackend::new(&config, SessionRecordStore::new(dir)).unwrap()
    }

    #[test]
    fn recipient_uses_whatsapp_jid() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(tmp.path());
        assert_eq!(
            backend.recipient_for("919876543210"),
            "919876543210@s.whatsapp.net"
        );
        assert_eq!(backend.name(), "whatsapp-web-bridge");
    }

    #[tokio::test]
    async fn existing_record_skips_instance_creation() {
        let tmp = TempDir::new().unwrap();
        let store = SessionRecordStore::new(tmp.path());
        store
            .save(&SessionRecord::new("pizza-order-bot", Some("tok".to_string())))
            .await
            .unwrap();

        // The bridge is unreachable, so reaching create_instance would fail.
        let backend = backend(tmp.path());
        assert_eq!(backend.ensure_instance().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_record_is_discarded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pizza-order-bot.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = SessionRecordStore::new(tmp.path());

        assert!(load_record(&store, "pizza-order-bot").await.is_none());
        assert!(!path.exists());
    }
}
