//! Broadcast event buses for session lifecycle and relay events.
//!
//! Provides a generic `EventBus` that distributes events to all subscribers
//! via a `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::EventBus;
