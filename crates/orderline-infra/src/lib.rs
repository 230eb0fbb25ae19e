//! Infrastructure layer for Orderline.
//!
//! Contains implementations of the ports defined in `orderline-core`:
//! the WhatsApp Web bridge messaging backend, the SVG QR renderer, plus the
//! configuration loader and data directory helpers.

pub mod bridge;
pub mod config;
pub mod filesystem;
pub mod qr;
