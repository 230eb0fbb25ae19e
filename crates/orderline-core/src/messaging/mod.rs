//! Messaging session adapter.
//!
//! - [`backend::MessagingBackend`]: the capability port a chat backend
//!   implements (initialize, send, lifecycle events).
//! - [`box_backend::BoxMessagingBackend`]: object-safe wrapper so the
//!   backend can be chosen at runtime or substituted in tests.
//! - [`session::MessagingSession`]: the single per-process session that owns
//!   the backend and tracks [`SessionState`](orderline_types::session::SessionState)
//!   from observed events.

pub mod backend;
pub mod box_backend;
pub mod session;

pub use backend::MessagingBackend;
pub use box_backend::BoxMessagingBackend;
pub use session::MessagingSession;
