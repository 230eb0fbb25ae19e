//! HTTP layer for Orderline.
//!
//! Axum router with the order and status API under `/api`, the real-time
//! WebSocket at `/ws`, and the static ordering page as fallback.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
