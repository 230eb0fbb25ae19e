//! Observability for Orderline: tracing subscriber setup and shutdown.

pub mod tracing_setup;

pub use tracing_setup::{LogFormat, init_tracing, shutdown_tracing};
