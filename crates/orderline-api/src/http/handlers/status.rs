//! Session status and health handlers.

use axum::Json;
use axum::extract::State;

use orderline_types::session::SessionStatus;

use crate::http::response::Health;
use crate::state::AppState;

/// GET /api/status - `{ready, info}`; `info` is null until the session is ready.
pub async fn get_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.session.status())
}

/// GET /health - liveness check, independent of the WhatsApp session.
pub async fn health_check(State(state): State<AppState>) -> Json<Health> {
    Json(Health::ok(state.session.backend_name()))
}
