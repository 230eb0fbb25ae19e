//! Success bodies returned by the API.

use serde::Serialize;

/// Body of a successful `POST /api/order`.
#[derive(Debug, Serialize)]
pub struct OrderAccepted {
    pub success: bool,
    /// Backend-assigned message id.
    pub id: String,
}

impl OrderAccepted {
    pub fn new(id: String) -> Self {
        Self { success: true, id }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    /// Name of the messaging backend in use.
    pub backend: String,
}

impl Health {
    pub fn ok(backend: impl Into<String>) -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            backend: backend.into(),
        }
    }
}
