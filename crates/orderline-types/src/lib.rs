//! Shared domain types for Orderline.
//!
//! This crate contains the types passed between the order API, the messaging
//! session adapter and the real-time relay: Order, SessionState, the event
//! enums, configuration and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, secrecy.

pub mod config;
pub mod error;
pub mod event;
pub mod order;
pub mod session;
