//! HTTP request handlers.

pub mod order;
pub mod status;
pub mod ws;
