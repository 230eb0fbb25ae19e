//! Order pipeline: validation, phone normalization, message formatting and
//! the submission service that ties them to the messaging session.

pub mod format;
pub mod phone;
pub mod service;
pub mod validate;

pub use format::OrderFormatter;
pub use service::OrderService;
