//! WebSocket handler for the real-time login relay.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. Once
//! connected, the handler:
//!
//! - **Forwards events:** subscribes to the relay bus on [`AppState`] and
//!   pushes every [`RelayEvent`] to the client as a JSON text frame.
//! - **Answers commands:** `{"type":"status"}` and `{"type":"ping"}`. Clients
//!   are not required to send anything.
//!
//! A subscriber only sees events emitted after it connected; a page that
//! loads after the QR was issued should ask for `status` and wait for the
//! next challenge.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use orderline_core::messaging::MessagingSession;
use orderline_types::session::SessionInfo;

use crate::state::AppState;

/// Incoming command from a WebSocket client.
///
/// Unknown or malformed messages are logged and ignored.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    /// Ask for the current session status.
    Status,
    /// Keep-alive ping. Server responds with `{"type":"pong"}`.
    Ping,
}

/// Replies to [`WsCommand`]s.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsReply {
    Status {
        ready: bool,
        info: Option<SessionInfo>,
    },
    Pong,
}

/// Upgrade an HTTP request to a WebSocket connection for relay events.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::now_v7();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut event_rx = state.relay_bus.subscribe();

    tracing::debug!(%conn_id, "WebSocket client connected");

    loop {
        tokio::select! {
            event_result = event_rx.recv() => {
                match event_result {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(json) => {
                            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            tracing::warn!("Failed to serialize RelayEvent: {err}");
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            %conn_id,
                            skipped = n,
                            "WebSocket subscriber lagged, skipping {n} events"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = process_command(&text, &state.session) {
                            let Ok(json) = serde_json::to_string(&reply) else {
                                continue;
                            };
                            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                tracing::debug!(%conn_id, "Failed to send reply (client disconnecting)");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%conn_id, "WebSocket receive error: {err}");
                        break;
                    }
                    // Binary, ping and pong frames are handled by axum.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(%conn_id, "WebSocket connection closed");
}

/// Parse one client command and build its reply.
fn process_command(text: &str, session: &MessagingSession) -> Option<WsReply> {
    let cmd: WsCommand = match serde_json::from_str(text) {
        Ok(cmd) => cmd,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring malformed WebSocket command");
            return None;
        }
    };

    Some(match cmd {
        WsCommand::Status => {
            let status = session.status();
            WsReply::Status {
                ready: status.ready,
                info: status.info,
            }
        }
        WsCommand::Ping => WsReply::Pong,
    })
}
