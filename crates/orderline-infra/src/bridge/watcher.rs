//! Connection watcher for the bridge instance.
//!
//! The bridge has no push channel we can rely on, so the watcher polls
//! `connectionState` and turns transitions into [`SessionEvent`]s. The
//! transition logic lives in [`WatchState`] so it can be tested without
//! a bridge.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use orderline_core::event::EventBus;
use orderline_types::event::SessionEvent;

use super::api::BridgeApi;
use super::store::SessionRecordStore;
use super::types::ConnectionState;

/// One poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    State(ConnectionState),
    /// The bridge has no instance by our name.
    Missing,
    Unreachable(String),
}

/// What the poll loop should do after an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Nothing,
    /// Fetch account info, then emit `Ready`.
    BecomeReady,
    /// Ask the bridge for a login challenge and offer it.
    RequestChallenge,
    /// Create the instance again; its challenge is offered like any other.
    RecreateInstance,
    Emit(SessionEvent),
}

#[derive(Debug, Default)]
pub struct WatchState {
    ready: bool,
    auth_failed: bool,
    last_challenge: Option<String>,
}

impl WatchState {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn observe(&mut self, observation: &Observation) -> Action {
        match observation {
            Observation::State(ConnectionState::Open) => {
                if self.ready {
                    return Action::Nothing;
                }
                self.ready = true;
                self.auth_failed = false;
                self.last_challenge = None;
                Action::BecomeReady
            }
            Observation::State(state @ (ConnectionState::Connecting | ConnectionState::Close)) => {
                if self.ready {
                    self.ready = false;
                    return Action::Emit(SessionEvent::Disconnected {
                        reason: state.as_str().to_string(),
                    });
                }
                self.auth_failed = false;
                Action::RequestChallenge
            }
            Observation::State(ConnectionState::Refused) => {
                if self.auth_failed {
                    return Action::Nothing;
                }
                self.ready = false;
                self.auth_failed = true;
                self.last_challenge = None;
                Action::Emit(SessionEvent::AuthFailure {
                    reason: "login refused by phone".to_string(),
                })
            }
            Observation::State(ConnectionState::Unknown(_)) => Action::Nothing,
            Observation::Missing => {
                self.auth_failed = false;
                self.last_challenge = None;
                if self.ready {
                    self.ready = false;
                    return Action::Emit(SessionEvent::Disconnected {
                        reason: "instance removed from bridge".to_string(),
                    });
                }
                Action::RecreateInstance
            }
            Observation::Unreachable(reason) => {
                if !self.ready {
                    return Action::Nothing;
                }
                self.ready = false;
                Action::Emit(SessionEvent::Disconnected {
                    reason: reason.clone(),
                })
            }
        }
    }

    /// Returns a `Qr` event only when the challenge differs from the last
    /// one offered.
    pub fn offer_challenge(&mut self, challenge: String) -> Option<SessionEvent> {
        if self.ready || self.last_challenge.as_deref() == Some(challenge.as_str()) {
            return None;
        }
        self.last_challenge = Some(challenge.clone());
        Some(SessionEvent::Qr { challenge })
    }
}

/// Poll the bridge until cancelled.
pub async fn watch(
    api: Arc<BridgeApi>,
    store: SessionRecordStore,
    events: EventBus<SessionEvent>,
    interval: Duration,
    initial_challenge: Option<String>,
    cancel: CancellationToken,
) {
    let mut state = WatchState::default();
    if let Some(challenge) = initial_challenge {
        offer(&mut state, &events, &api, challenge);
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let observation = match api.connection_state().await {
            Ok(Some(state)) => Observation::State(state),
            Ok(None) => Observation::Missing,
            Err(err) => {
                tracing::debug!(error = %err, "Bridge connection state poll failed");
                Observation::Unreachable(err.to_string())
            }
        };

        match state.observe(&observation) {
            Action::Nothing => {}
            Action::BecomeReady => {
                let info = api.fetch_info().await.unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "Could not fetch account info");
                    Default::default()
                });
                tracing::info!(instance = api.instance(), "WhatsApp session ready");
                events.publish(SessionEvent::Ready { info });
            }
            Action::RequestChallenge => match api.connect().await {
                Ok(Some(challenge)) => offer(&mut state, &events, &api, challenge),
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "Failed to request login QR"),
            },
            Action::RecreateInstance => match super::recreate_instance(&api, &store).await {
                Ok(Some(challenge)) => offer(&mut state, &events, &api, challenge),
                // The next poll sees `connecting` and asks for a QR.
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "Failed to recreate bridge instance"),
            },
            Action::Emit(event) => {
                tracing::warn!(event = event.kind(), instance = api.instance(), "Session state changed");
                events.publish(event);
            }
        }
    }

    tracing::debug!(instance = api.instance(), "Bridge watcher stopped");
}

fn offer(state: &mut WatchState, events: &EventBus<SessionEvent>, api: &BridgeApi, challenge: String) {
    if let Some(event) = state.offer_challenge(challenge) {
        tracing::info!(instance = api.instance(), "New login QR issued");
        events.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(s: ConnectionState) -> Observation {
        Observation::State(s)
    }

    #[test]
    fn open_becomes_ready_once() {
        let mut w = WatchState::default();
        assert_eq!(w.observe(&state(ConnectionState::Open)), Action::BecomeReady);
        assert!(w.is_ready());
        assert_eq!(w.observe(&state(ConnectionState::Open)), Action::Nothing);
    }

    #[test]
    fn not_ready_close_requests_challenge() {
        let mut w = WatchState::default();
        assert_eq!(
            w.observe(&state(ConnectionState::Close)),
            Action::RequestChallenge
        );
        assert_eq!(
            w.observe(&state(ConnectionState::Connecting)),
            Action::RequestChallenge
        );
    }

    #[test]
    fn close_after_ready_disconnects_then_requests_challenge() {
        let mut w = WatchState::default();
        w.observe(&state(ConnectionState::Open));

        assert_eq!(
            w.observe(&state(ConnectionState::Close)),
            Action::Emit(SessionEvent::Disconnected {
                reason: "close".to_string()
            })
        );
        assert!(!w.is_ready());
        assert_eq!(
            w.observe(&state(ConnectionState::Close)),
            Action::RequestChallenge
        );
    }

    #[test]
    fn refused_emits_auth_failure_once() {
        let mut w = WatchState::default();
        assert!(matches!(
            w.observe(&state(ConnectionState::Refused)),
            Action::Emit(SessionEvent::AuthFailure { .. })
        ));
        assert_eq!(w.observe(&state(ConnectionState::Refused)), Action::Nothing);
    }

    #[test]
    fn unreachable_only_matters_while_ready() {
        let mut w = WatchState::default();
        let down = Observation::Unreachable("bridge unreachable".to_string());
        assert_eq!(w.observe(&down), Action::Nothing);

        w.observe(&state(ConnectionState::Open));
        assert_eq!(
            w.observe(&down),
            Action::Emit(SessionEvent::Disconnected {
                reason: "bridge unreachable".to_string()
            })
        );
    }

    #[test]
    fn unknown_state_is_ignored() {
        let mut w = WatchState::default();
        assert_eq!(
            w.observe(&state(ConnectionState::Unknown("syncing".to_string()))),
            Action::Nothing
        );
    }

    #[test]
    fn repeated_challenge_is_not_reoffered() {
        let mut w = WatchState::default();
        assert_eq!(
            w.offer_challenge("2@a".to_string()),
            Some(SessionEvent::Qr {
                challenge: "2@a".to_string()
            })
        );
        assert_eq!(w.offer_challenge("2@a".to_string()), None);
        assert!(w.offer_challenge("2@b".to_string()).is_some());
    }

    #[test]
    fn no_challenge_while_ready() {
        let mut w = WatchState::default();
        w.observe(&state(ConnectionState::Open));
        assert_eq!(w.offer_challenge("2@a".to_string()), None);
    }

    #[test]
    fn ready_clears_last_challenge() {
        let mut w = WatchState::default();
        w.offer_challenge("2@a".to_string());
        w.observe(&state(ConnectionState::Open));
        w.observe(&state(ConnectionState::Close));
        assert!(w.offer_challenge("2@a".to_string()).is_some());
    }

    #[test]
    fn missing_instance_is_recreated_and_reoffered() {
        let mut w = WatchState::default();
        w.offer_challenge("2@old".to_string());

        assert_eq!(w.observe(&Observation::Missing), Action::RecreateInstance);
        assert_eq!(w.observe(&Observation::Missing), Action::RecreateInstance);
        assert!(w.offer_challenge("2@old".to_string()).is_some());
    }

    #[test]
    fn missing_instance_while_ready_disconnects_first() {
        let mut w = WatchState::default();
        w.observe(&state(ConnectionState::Open));

        assert_eq!(
            w.observe(&Observation::Missing),
            Action::Emit(SessionEvent::Disconnected {
                reason: "instance removed from bridge".to_string()
            })
        );
        assert!(!w.is_ready());
        assert_eq!(w.observe(&Observation::Missing), Action::RecreateInstance);
    }
}
