//! Business logic and port definitions for Orderline.
//!
//! This crate defines the "ports" (the messaging backend and QR renderer
//! traits) that the infrastructure layer implements, plus the pure order
//! pipeline. It depends only on `orderline-types` -- never on
//! `orderline-infra` or any HTTP/filesystem crate.

pub mod event;
pub mod messaging;
pub mod order;
pub mod relay;
